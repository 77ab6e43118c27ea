//! 完整运行测试：登录 → 遍历 → 分批上传 → 下载 → 清理 → 报告

mod common;

use common::*;
use decode_mirror::services::archive_retriever::BANNER;
use decode_mirror::{App, AppError};
use std::path::PathBuf;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 源目录：a.php 需要解码，b.php 原样复制，sub/c.txt 原样复制
fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.php"), encoded_php("class A {}")).unwrap();
    std::fs::write(dir.path().join("b.php"), "<?php echo 'plain';").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();
    std::fs::write(dir.path().join("sub").join("c.txt"), [0u8, 159, 146, 150]).unwrap();
    dir
}

async fn mount_happy_remote(server: &MockServer) {
    mount_login_ok(server).await;
    mount_empty_queue(server).await;
    mount_upload_page(server).await;
    mount_upload_response(server, success_notice("a.php")).await;
    let decoded = format!("<?php{}class A {{}}", BANNER);
    mount_archive(server, zip_of(&[("a.php", &decoded)])).await;
}

#[tokio::test]
async fn test_end_to_end_mirror() {
    let server = MockServer::start().await;
    mount_happy_remote(&server).await;

    let source = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");
    let report_path = out.path().join("report.json");

    let mut config = test_config(&server, source.path(), &dest);
    config.report_file = Some(report_path.clone());

    let app = App::initialize(config).await.unwrap();
    let report = app.run().await.unwrap();

    // 解码结果去掉了横幅
    assert_eq!(std::fs::read_to_string(dest.join("a.php")).unwrap(), "<?php\nclass A {}");
    // 普通文件逐字节复制
    assert_eq!(
        std::fs::read(dest.join("b.php")).unwrap(),
        std::fs::read(source.path().join("b.php")).unwrap()
    );
    assert_eq!(std::fs::read(dest.join("sub").join("c.txt")).unwrap(), vec![0u8, 159, 146, 150]);

    // 只上传了 a.php
    let bodies = upload_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(uploaded_file_names(&bodies[0]), vec!["a.php"]);

    assert!(report.failed.is_empty());
    assert_eq!(report.stats.directories, 2);
    assert_eq!(report.stats.copied, 2);
    assert_eq!(report.stats.decoded, 1);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["failed"].as_array().map(|a| a.len()), Some(0));
    assert_eq!(json["stats"]["batches"], 1);
}

#[tokio::test]
async fn test_auth_failure_touches_nothing() {
    let server = MockServer::start().await;
    mount_login_rejected(&server).await;
    Mock::given(path_regex("^/decoder"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");

    let result = App::initialize(test_config(&server, source.path(), &dest)).await;
    assert!(matches!(result, Err(AppError::AuthFailure { .. })));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_second_run_skips_existing_outputs() {
    let server = MockServer::start().await;
    mount_happy_remote(&server).await;

    let source = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");

    let first = App::initialize(test_config(&server, source.path(), &dest)).await.unwrap();
    first.run().await.unwrap();
    assert_eq!(upload_bodies(&server).await.len(), 1);

    let second = App::initialize(test_config(&server, source.path(), &dest)).await.unwrap();
    let report = second.run().await.unwrap();

    assert_eq!(upload_bodies(&server).await.len(), 1);
    assert_eq!(report.stats.skipped_existing, 1);
    assert_eq!(report.stats.batches, 0);
}

#[tokio::test]
async fn test_overwrite_resubmits_existing_outputs() {
    let server = MockServer::start().await;
    mount_happy_remote(&server).await;

    let source = sample_tree();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("a.php"), "stale").unwrap();

    let mut config = test_config(&server, source.path(), &dest);
    config.overwrite = true;
    App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(upload_bodies(&server).await.len(), 1);
    assert_eq!(std::fs::read_to_string(dest.join("a.php")).unwrap(), "<?php\nclass A {}");
}

#[tokio::test]
async fn test_download_failure_reports_every_batch_file() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_empty_queue(&server).await;
    mount_upload_page(&server).await;
    // a 成功，b 失败，c 没有出现在响应中
    mount_upload_response(
        &server,
        format!("{}{}", success_notice("a.php"), failure_notice("b.php")),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/download.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = tempfile::tempdir().unwrap();
    for name in ["a.php", "b.php", "c.php"] {
        std::fs::write(source.path().join(name), encoded_php(name)).unwrap();
    }
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");

    let app = App::initialize(test_config(&server, source.path(), &dest)).await.unwrap();
    let report = app.run().await.unwrap();

    let mut failed = report.failed.clone();
    failed.sort();
    let expected: Vec<PathBuf> = ["a.php", "b.php", "c.php"]
        .iter()
        .map(|n| source.path().join(n))
        .collect();
    assert_eq!(failed, expected);
    assert!(!dest.join("a.php").exists());
}

#[tokio::test]
async fn test_thirty_files_upload_in_two_ordered_batches() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_empty_queue(&server).await;
    mount_upload_page(&server).await;
    mount_upload_response(&server, "<p>queued</p>".to_string()).await;

    let source = tempfile::tempdir().unwrap();
    let names: Vec<String> = (0..30).map(|i| format!("f{:02}.php", i)).collect();
    for name in &names {
        std::fs::write(source.path().join(name), encoded_php(name)).unwrap();
    }
    let out = tempfile::tempdir().unwrap();

    let app = App::initialize(test_config(&server, source.path(), &out.path().join("mirror")))
        .await
        .unwrap();
    let report = app.run().await.unwrap();

    let bodies = upload_bodies(&server).await;
    assert_eq!(bodies.len(), 2);
    assert_eq!(uploaded_file_names(&bodies[0]), names[..25].to_vec());
    assert_eq!(uploaded_file_names(&bodies[1]), names[25..].to_vec());

    // 响应中没有任何结果，全部记为未解码
    assert_eq!(report.failed.len(), 30);
    assert_eq!(report.stats.batches, 2);
}

#[tokio::test]
async fn test_stuck_queue_aborts_before_upload() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    Mock::given(method("GET"))
        .and(path(QUEUE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<input name="file[]" value="9">"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(QUEUE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DECODER_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let source = sample_tree();
    let out = tempfile::tempdir().unwrap();

    let app = App::initialize(test_config(&server, source.path(), &out.path().join("mirror")))
        .await
        .unwrap();
    let result = app.run().await;
    assert!(matches!(result, Err(AppError::QueueStuck { attempts: 5 })));
}

#[tokio::test]
async fn test_destination_inside_source_is_not_mirrored_into_itself() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_empty_queue(&server).await;

    let root = tempfile::tempdir().unwrap();
    let tree = root.path().join("tree");
    std::fs::create_dir_all(tree.join("sub")).unwrap();
    std::fs::create_dir_all(tree.join("out")).unwrap();
    std::fs::write(tree.join("a.txt"), "a").unwrap();
    std::fs::write(tree.join("out").join("b.txt"), "from last run").unwrap();

    // 源目录用另一种写法给出，和目标目录不是同一个前缀
    let source = tree.join("sub").join("..");
    let dest = tree.join("out");

    let app = App::initialize(test_config(&server, &source, &dest)).await.unwrap();
    let report = app.run().await.unwrap();

    assert_eq!(report.stats.directories, 2);
    assert!(dest.join("a.txt").is_file());
    assert!(dest.join("sub").is_dir());
    assert!(!dest.join("out").exists());
}

#[tokio::test]
async fn test_stale_output_is_not_counted_as_decoded() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_empty_queue(&server).await;
    mount_upload_page(&server).await;
    mount_upload_response(&server, success_notice("a.php")).await;
    // 压缩包里没有 a.php
    mount_archive(&server, zip_of(&[("zzz.php", "<?php echo 'z';")])).await;

    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.php"), encoded_php("a")).unwrap();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");
    std::fs::create_dir_all(&dest).unwrap();
    std::fs::write(dest.join("a.php"), "stale").unwrap();

    let mut config = test_config(&server, source.path(), &dest);
    config.overwrite = true;
    let report = App::initialize(config).await.unwrap().run().await.unwrap();

    assert_eq!(report.failed, vec![source.path().join("a.php")]);
    assert_eq!(report.stats.decoded, 0);
    assert_eq!(std::fs::read_to_string(dest.join("a.php")).unwrap(), "stale");
}

#[tokio::test]
async fn test_upload_failure_in_one_directory_does_not_stop_the_walk() {
    let server = MockServer::start().await;
    mount_login_ok(&server).await;
    mount_empty_queue(&server).await;
    // 第一次打开上传页时没有上传控件
    Mock::given(method("GET"))
        .and(path(DECODER_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>Maintenance</p>"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_upload_page(&server).await;
    mount_upload_response(&server, success_notice("c.php")).await;
    let decoded = format!("<?php{}class C {{}}", BANNER);
    mount_archive(&server, zip_of(&[("c.php", &decoded)])).await;

    let source = tempfile::tempdir().unwrap();
    std::fs::write(source.path().join("a.php"), encoded_php("a")).unwrap();
    std::fs::write(source.path().join("b.php"), encoded_php("b")).unwrap();
    std::fs::create_dir(source.path().join("sub")).unwrap();
    std::fs::write(source.path().join("sub").join("c.php"), encoded_php("c")).unwrap();
    let out = tempfile::tempdir().unwrap();
    let dest = out.path().join("mirror");

    let app = App::initialize(test_config(&server, source.path(), &dest)).await.unwrap();
    let report = app.run().await.unwrap();

    assert_eq!(
        report.failed,
        vec![source.path().join("a.php"), source.path().join("b.php")]
    );
    assert_eq!(
        std::fs::read_to_string(dest.join("sub").join("c.php")).unwrap(),
        "<?php\nclass C {}"
    );
    assert_eq!(report.stats.batches, 2);
    assert_eq!(report.stats.decoded, 1);

    let bodies = upload_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(uploaded_file_names(&bodies[0]), vec!["c.php"]);

    // 运行前一次，每批之后各一次
    assert_eq!(queue_reads(&server).await, 3);
}
