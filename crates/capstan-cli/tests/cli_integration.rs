//! End-to-end tests for the capstan binary.
//!
//! HTTP-facing commands run against a wiremock server; the binary itself
//! runs via assert_cmd on a blocking thread so the mock server stays live
//! on the test runtime.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn capstan() -> Command {
    Command::cargo_bin("capstan").unwrap()
}

#[test]
fn help_lists_every_command() {
    capstan()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("version"))
        .stdout(predicate::str::contains("project"));
}

#[test]
fn version_subcommand_and_alias_print_the_client_version() {
    capstan()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("capstan v"));

    capstan()
        .arg("v")
        .assert()
        .success()
        .stdout(predicate::str::contains("capstan v"));
}

#[test]
fn unknown_command_fails() {
    capstan()
        .arg("bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn apply_without_a_manifest_source_fails() {
    let tmp = TempDir::new().unwrap();

    capstan()
        .current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no manifest file"));
}

#[test]
fn apply_rejects_broken_json_before_sending() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.json"), "not json").unwrap();

    capstan()
        .current_dir(tmp.path())
        .args(["apply", "-f", "bad.json", "-e", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid JSON"));
}

#[tokio::test(flavor = "multi_thread")]
async fn apply_relays_the_manifest_and_prints_the_response() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/apply"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(serde_json::json!({"name": "web", "image": "acme/shop:v1"})))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"applied":1}"#))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("web.json"),
        r#"{"name": "web", "image": "acme/shop:v1"}"#,
    )
    .unwrap();

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .args(["apply", "-f", "web.json", "-e", &uri])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"applied\": 1"))
            .stdout(predicate::str::contains("apply accepted"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn apply_prints_the_body_and_fails_on_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/apply"))
        .respond_with(
            ResponseTemplate::new(422).set_body_string(r#"{"error":"image tag is required"}"#),
        )
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("web.json"), r#"{"name": "web"}"#).unwrap();

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .args(["apply", "-f", "web.json", "-e", &uri])
            .assert()
            .failure()
            .stdout(predicate::str::contains("image tag is required"))
            .stderr(predicate::str::contains("apply failed"))
            .stderr(predicate::str::contains("422"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn apply_notes_an_empty_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/apply"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("web.json"), r#"{"name": "web"}"#).unwrap();

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .args(["apply", "-f", "web.json", "-e", &uri])
            .assert()
            .success()
            .stdout(predicate::str::contains("(empty response body)"))
            .stdout(predicate::str::contains("apply accepted"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_relays_the_manifest() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"deleted":1}"#))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("web.json"), r#"{"name": "web"}"#).unwrap();

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .args(["delete", "-f", "web.json", "-e", &uri])
            .assert()
            .success()
            .stdout(predicate::str::contains("delete accepted"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn get_pretty_prints_the_object_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"[{"host":"shop.acme.dev"}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .args(["get", "route", "-e", &uri])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"host\": \"shop.acme.dev\""));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn get_failure_still_prints_the_server_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such collection"))
        .mount(&server)
        .await;

    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .args(["get", "nope", "-e", &uri])
            .assert()
            .failure()
            .stdout(predicate::str::contains("no such collection"))
            .stderr(predicate::str::contains("404"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn endpoint_comes_from_the_environment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let uri = server.uri();
    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
            .env("CAPSTAN_ENDPOINT", &uri)
            .args(["get", "service"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn endpoint_comes_from_the_project_local_config_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"host":"a"}]"#))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("capstan.toml"),
        format!("endpoint = \"{}\"\n", server.uri()),
    )
    .unwrap();

    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
            .args(["get", "route"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"host\": \"a\""));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn endpoint_comes_from_the_user_config_dir() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"host":"b"}]"#))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let xdg = tmp.path().join("xdg");
    fs::create_dir_all(xdg.join("capstan")).unwrap();
    fs::write(
        xdg.join("capstan").join("config.toml"),
        format!("endpoint = \"{}\"\n", server.uri()),
    )
    .unwrap();

    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .env("XDG_CONFIG_HOME", &xdg)
            .args(["get", "route"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"host\": \"b\""));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn project_local_config_overrides_the_user_config_dir() {
    let local_server = MockServer::start().await;
    let user_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&local_server)
        .await;

    // The user-dir endpoint must never be contacted once the
    // project-local file overrides it.
    Mock::given(method("GET"))
        .and(path("/route"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(0)
        .mount(&user_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let xdg = tmp.path().join("xdg");
    fs::create_dir_all(xdg.join("capstan")).unwrap();
    fs::write(
        xdg.join("capstan").join("config.toml"),
        format!("endpoint = \"{}\"\n", user_server.uri()),
    )
    .unwrap();
    fs::write(
        tmp.path().join("capstan.toml"),
        format!("endpoint = \"{}\"\n", local_server.uri()),
    )
    .unwrap();

    tokio::task::spawn_blocking(move || {
        capstan()
            .current_dir(tmp.path())
            .env("XDG_CONFIG_HOME", &xdg)
            .args(["get", "route"])
            .assert()
            .success();
    })
    .await
    .unwrap();
}

#[test]
fn project_without_a_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    capstan()
        .current_dir(tmp.path())
        .arg("project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read project.json"));
}

#[test]
fn project_rejects_unsupported_manifest_versions() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("project.json"),
        r#"{"version": "v2", "teamName": "acme", "projectName": "shop"}"#,
    )
    .unwrap();

    capstan()
        .current_dir(tmp.path())
        .arg("project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported manifest version"));
}

#[test]
fn project_with_no_services_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("project.json"),
        r#"{"version": "v1", "teamName": "acme", "projectName": "shop", "services": []}"#,
    )
    .unwrap();

    capstan()
        .current_dir(tmp.path())
        .arg("project")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to apply"));
}
