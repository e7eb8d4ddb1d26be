use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tempfile::TempDir;
use tokio::time::{sleep, timeout};

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Write a seed file and a sqlite-backed config into `dir`, returning the config path.
fn write_sqlite_config(dir: &Path, port: u16) -> std::path::PathBuf {
    let seed_path = dir.join("seed.json");
    let seed = json!([
        {
            "id": 5,
            "name": "Ua Perm",
            "moves": "R U' R U R U R U' R' U' R2",
            "videoId": "abc123",
            "videoStart": 12,
            "videoEnd": 25,
            "shortNote": "Bar on the back",
            "category": "PLL",
            "imageUrl": "https://img.example/ua.png"
        },
        {
            "id": 1,
            "name": "Aa Perm",
            "moves": "x R' U R' D2 R U' R' D2 R2 x'",
            "category": "PLL"
        },
        {
            "id": 23,
            "name": "OLL 1",
            "moves": "R U2 R2 F R F' U2 R' F R F'",
            "category": "OLL"
        }
    ]);
    std::fs::write(&seed_path, serde_json::to_vec_pretty(&seed).unwrap()).unwrap();

    let config_path = dir.join("config.toml");
    let config = format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[store]
backend = "sqlite"

[store.sqlite]
path = "{}"
seed_file = "{}"
"#,
        port,
        dir.join("algorithms.db").display(),
        seed_path.display()
    );
    std::fs::write(&config_path, config).unwrap();
    config_path
}

/// Spawn the server and return a handle
fn spawn_server(config_path: &Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_cubealg"))
        .env("CUBEALG_CONFIG", config_path)
        .env_remove("PORT")
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/v1/", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_root_endpoint() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_sqlite_config(dir.path(), port);

    let mut server = spawn_server(&config_path);
    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/v1/", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "running");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_lookup_against_seeded_sqlite_store() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_sqlite_config(dir.path(), port);

    let mut server = spawn_server(&config_path);
    assert!(
        wait_for_server(port, 100).await,
        "Server did not start in time"
    );

    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/v1/algorithm/Ua%20Perm", port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["id"], 5);
    assert_eq!(json["videoId"], "abc123");
    assert_eq!(json["shortNote"], "Bar on the back");

    let response = client
        .get(format!("http://127.0.0.1:{}/v1/algorithmCategory/PLL", port))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);

    // Initial picks are id 1 and id 23
    let response = client
        .get(format!("http://127.0.0.1:{}/v1/randomPLL/", port))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["name"], "Aa Perm");

    let response = client
        .get(format!("http://127.0.0.1:{}/v1/randomOLL/", port))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["name"], "OLL 1");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_port_env_overrides_config() {
    let dir = TempDir::new().unwrap();
    let config_port = get_available_port();
    let env_port = get_available_port();
    let config_path = write_sqlite_config(dir.path(), config_port);

    let mut server = tokio::process::Command::new(env!("CARGO_BIN_EXE_cubealg"))
        .env("CUBEALG_CONFIG", &config_path)
        .env("PORT", env_port.to_string())
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");

    assert!(
        wait_for_server(env_port, 100).await,
        "Server did not listen on PORT"
    );

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let mut server = tokio::process::Command::new(env!("CARGO_BIN_EXE_cubealg"))
        .env("CUBEALG_CONFIG", &missing)
        .env("RUST_LOG", "error")
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server");

    let status = timeout(Duration::from_secs(10), server.wait())
        .await
        .expect("Server should exit on missing config")
        .expect("Failed to wait for server");

    assert!(!status.success());
}

#[tokio::test]
async fn test_invalid_selector_config_fails() {
    let dir = TempDir::new().unwrap();
    let port = get_available_port();
    let config_path = write_sqlite_config(dir.path(), port);

    let mut config = std::fs::read_to_string(&config_path).unwrap();
    config.push_str("\n[selector]\noll_initial_index = 5\n");
    std::fs::write(&config_path, config).unwrap();

    let mut server = spawn_server(&config_path);

    let status = timeout(Duration::from_secs(10), server.wait())
        .await
        .expect("Server should exit on invalid config")
        .expect("Failed to wait for server");

    assert!(!status.success());
}
