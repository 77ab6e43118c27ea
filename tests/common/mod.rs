#![allow(dead_code)]

use decode_mirror::config::DEFAULT_MARKER;
use decode_mirror::infrastructure::{RemoteSession, SessionOptions};
use decode_mirror::Config;
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const DECODER: &str = "ic10php72";
pub const DECODER_PATH: &str = "/decoder/ic10php72";
pub const QUEUE_PATH: &str = "/decoder/ic10php72/1";
pub const UPLOAD_FIELD: &str = "upl_77e1[]";

pub const UPLOAD_PAGE: &str = r#"<html><body>
<form action="" method="post" enctype="multipart/form-data">
  <input type="file" name="upl_77e1[]" id="uploadfileblue" class="inputfile" multiple>
  <input type="submit" name="submit" value="Decode">
</form>
</body></html>"#;

pub const EMPTY_QUEUE_PAGE: &str = r#"<html><body><p>No files</p></body></html>"#;

pub fn encoded_php(body: &str) -> String {
    format!("<?php //0046a\n{}{{die('loader');}}\n{}", DEFAULT_MARKER, body)
}

pub fn success_notice(name: &str) -> String {
    format!(r#"<div class="alert alert-success"><strong>Success</strong> {} decoded</div>"#, name)
}

pub fn failure_notice(name: &str) -> String {
    format!(r#"<div class="alert alert-danger">Error: cannot decode {} (unsupported)</div>"#, name)
}

pub fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, text) in entries {
        writer
            .start_file(*name, zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(text.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn session_options(server: &MockServer) -> SessionOptions {
    SessionOptions {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(10),
    }
}

pub fn test_config(server: &MockServer, source: &Path, destination: &Path) -> Config {
    Config {
        username: Some("alice".to_string()),
        password: Some("secret".to_string()),
        source: source.to_path_buf(),
        destination: Some(destination.to_path_buf()),
        base_url: server.uri(),
        request_timeout_secs: 5,
        upload_timeout_secs: 10,
        max_clear_attempts: 5,
        log_file: destination.with_extension("log"),
        ..Default::default()
    }
}

/// 登录成功：302 到 /account
pub async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/account"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Account</h1>"))
        .mount(server)
        .await;
}

/// 登录失败：停留在登录页，仍然是 200
pub async fn mount_login_rejected(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form>Wrong password</form>"))
        .mount(server)
        .await;
}

pub async fn mount_empty_queue(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(QUEUE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_QUEUE_PAGE))
        .mount(server)
        .await;
}

pub async fn mount_upload_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(DECODER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(UPLOAD_PAGE))
        .mount(server)
        .await;
}

pub async fn mount_upload_response(server: &MockServer, html: String) {
    Mock::given(method("POST"))
        .and(path(DECODER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

pub async fn mount_archive(server: &MockServer, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path("/download.php"))
        .and(query_param("id", "all"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/zip")
                .set_body_bytes(bytes),
        )
        .mount(server)
        .await;
}

pub async fn login(server: &MockServer) -> RemoteSession {
    RemoteSession::authenticate(session_options(server), "alice", "secret")
        .await
        .expect("登录失败")
}

/// 所有上传请求的 multipart 正文，按接收顺序
pub async fn upload_bodies(server: &MockServer) -> Vec<String> {
    let requests: Vec<Request> = server.received_requests().await.unwrap_or_default();
    requests
        .into_iter()
        .filter(|r| r.method.as_str() == "POST" && r.url.path() == DECODER_PATH)
        .map(|r| String::from_utf8_lossy(&r.body).to_string())
        .collect()
}

/// multipart 正文中的文件名
pub fn uploaded_file_names(body: &str) -> Vec<String> {
    body.split("filename=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

/// 读取队列页面的次数
pub async fn queue_reads(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "GET" && r.url.path() == QUEUE_PATH)
        .count()
}
