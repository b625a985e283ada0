use claps::article::Section;
use claps::config::Config;
use claps::process::process_site;
use claps::store;
use claps::valuate::WordStat;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn article_page(author: &str, title: &str, body: &str, claps: &str) -> String {
    format!(
        r#"<html><body>
            <a href="/{author}?source=post_page">{author}</a>
            <article><h1>{title}</h1><p>{body}</p></article>
            <button aria-label="claps"><span>{claps}</span></button>
        </body></html>"#
    )
}

async fn mount(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_listing_into_files() {
    let server = MockServer::start().await;
    let uri = server.uri();

    let listing = format!(
        r#"<html><body>
            <a href="{uri}/fox-facts?source=home">one</a>
            <a href="{uri}/fox-facts?source=sidebar">one again</a>
            <a href="{uri}/dog-days?source=home">two</a>
            <a href="{uri}/no-author?source=home">three</a>
            <a href="{uri}/gone?source=home">four</a>
        </body></html>"#
    );
    mount(&server, "/latest", listing).await;
    mount(&server, "/fox-facts", article_page("@alice", "Fox Facts", "fox fox den", "30")).await;
    mount(&server, "/dog-days", article_page("@alice", "Dog Days", "the fox sleeps", "1.2K")).await;
    mount(
        &server,
        "/no-author",
        "<html><body><article><h1>Orphan</h1></article></body></html>".to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let config = Config {
        listing_url: format!("{uri}/latest"),
        publication: server.address().to_string(),
        out_dir: out.path().to_path_buf(),
        concurrency: 2,
        ..Config::default()
    };

    let state = process_site(config).await.unwrap();

    let alice = state.authors["@alice"];
    assert_eq!(alice.total_claps, 1230);
    assert_eq!(alice.article_count, 2);
    assert_eq!(state.authors.len(), 1);

    // fox fox den -> 10 each; fox sleeps -> 600 each
    assert_eq!(state.language[&Section::Content]["fox"], WordStat::new(3, 620.0));
    assert_eq!(state.language[&Section::Title]["fox"], WordStat::new(1, 15.0));
    assert!(!state.language.contains_key(&Section::Subtitle));

    let saved = store::load(out.path()).unwrap();
    assert_eq!(saved, state);
}

#[tokio::test]
async fn test_resume_adds_to_saved_totals() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount(
        &server,
        "/latest",
        format!(r#"<a href="{uri}/fox-facts?source=home">one</a>"#),
    )
    .await;
    mount(&server, "/fox-facts", article_page("@bob", "Fox", "fox", "5")).await;

    let out = tempfile::tempdir().unwrap();
    let config = Config {
        listing_url: format!("{uri}/latest"),
        publication: server.address().to_string(),
        out_dir: out.path().to_path_buf(),
        ..Config::default()
    };

    process_site(config.clone()).await.unwrap();
    let state = process_site(Config {
        resume: true,
        ..config
    })
    .await
    .unwrap();

    assert_eq!(state.authors["@bob"].total_claps, 10);
    assert_eq!(state.authors["@bob"].article_count, 2);
    assert_eq!(state.language[&Section::Content]["fox"], WordStat::new(2, 10.0));
}

async fn serve_two_articles(server: &MockServer) {
    let uri = server.uri();
    let listing = format!(
        r#"<a href="{uri}/fox-facts?source=home">one</a>
           <a href="{uri}/the-dog?source=home">two</a>"#
    );
    mount(server, "/latest", listing).await;
    mount(server, "/fox-facts", article_page("@alice", "Fox", "the fox den", "30")).await;
    mount(server, "/the-dog", article_page("@bob", "Dog", "the dog", "6")).await;
}

fn config_for(server: &MockServer, out: &std::path::Path) -> Config {
    Config {
        listing_url: format!("{}/latest", server.uri()),
        publication: server.address().to_string(),
        out_dir: out.to_path_buf(),
        ..Config::default()
    }
}

#[tokio::test]
async fn test_limit_stops_after_first_articles() {
    let server = MockServer::start().await;
    serve_two_articles(&server).await;
    let out = tempfile::tempdir().unwrap();

    let state = process_site(Config {
        limit: 1,
        ..config_for(&server, out.path())
    })
    .await
    .unwrap();

    let articles: u64 = state.authors.values().map(|a| a.article_count).sum();
    assert_eq!(articles, 1);
    // Discovered links are sorted, so the first one is fox-facts.
    assert!(state.authors.contains_key("@alice"));
}

#[tokio::test]
async fn test_stopwords_file_replaces_builtin_list() {
    let server = MockServer::start().await;
    serve_two_articles(&server).await;
    let out = tempfile::tempdir().unwrap();
    let stops = out.path().join("stops.txt");
    std::fs::write(&stops, "fox\n").unwrap();

    let state = process_site(Config {
        stopwords: Some(stops),
        ..config_for(&server, out.path().join("data").as_path())
    })
    .await
    .unwrap();

    let content = &state.language[&Section::Content];
    assert!(!content.contains_key("fox"));
    // "the" is only filtered by the built-in list: the den -> 15 each
    assert_eq!(content["the"], WordStat::new(2, 18.0));
    assert_eq!(content["den"], WordStat::new(1, 15.0));
}

#[tokio::test]
async fn test_periodic_save_writes_files() {
    let server = MockServer::start().await;
    serve_two_articles(&server).await;
    let out = tempfile::tempdir().unwrap();

    let state = process_site(Config {
        save_every: 1,
        ..config_for(&server, out.path())
    })
    .await
    .unwrap();

    assert!(out.path().join("language.json").exists());
    assert!(out.path().join("authors.json").exists());
    assert_eq!(store::load(out.path()).unwrap(), state);
}

#[tokio::test]
async fn test_failed_periodic_save_reports_io_error() {
    let server = MockServer::start().await;
    serve_two_articles(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("file");
    std::fs::write(&not_a_dir, "").unwrap();

    let err = process_site(Config {
        save_every: 1,
        ..config_for(&server, &not_a_dir)
    })
    .await
    .unwrap_err();

    assert!(matches!(err, claps::Error::Io(_)), "{err:?}");
}
