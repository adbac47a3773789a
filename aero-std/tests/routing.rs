use aero_std::{Route, RouteParams, Router, RoutingError};

fn params(pairs: &[(&str, &str)]) -> RouteParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn site() -> Router {
    Router::builder()
        .route("index", Route::new("/").with_default("controller", "site:page:home"))
        .route("about", Route::new("/about"))
        .route(
            "user",
            Route::new("/user/{id}")
                .with_requirement("id", r"\d+")
                .with_default("controller", "site:user:show"),
        )
        .route("blog", Route::new("/blog/{page}").with_default("page", "1"))
        .route("file", Route::new("/file/{name}.{ext}"))
        .build()
}

#[test]
fn test_literal_routes_match_exactly() {
    let router = site();
    assert_eq!(router.match_path("/about").unwrap().unwrap().name(), "about");
    assert!(router.match_path("/about/team").unwrap().is_none());
    assert_eq!(router.match_path("/").unwrap().unwrap().name(), "index");
}

#[test]
fn test_variable_capture_with_requirement() {
    let router = site();
    let matched = router.match_path("/user/42").unwrap().unwrap();
    assert_eq!(matched.name(), "user");
    assert_eq!(matched.param("id"), Some("42"));
    assert_eq!(matched.param("controller"), Some("site:user:show"));

    assert!(router.match_path("/user/").unwrap().is_none());
    assert!(router.match_path("/user").unwrap().is_none());
    assert!(router.match_path("/user/abc").unwrap().is_none());
}

#[test]
fn test_optional_page() {
    let router = site();
    assert_eq!(router.match_path("/blog").unwrap().unwrap().param("page"), Some("1"));
    assert_eq!(router.match_path("/blog/3").unwrap().unwrap().param("page"), Some("3"));
}

#[test]
fn test_name_and_extension_split_on_dot() {
    let matched = site().match_path("/file/report.pdf").unwrap().unwrap();
    assert_eq!(
        matched.params(),
        &params(&[("ext", "pdf"), ("name", "report")])
    );
}

#[test]
fn test_assemble_round_trips_through_match() {
    let router = site();
    let path = router.assemble("user", &params(&[("id", "7")])).unwrap();
    assert_eq!(path, "/user/7");
    assert_eq!(router.match_path(&path).unwrap().unwrap().param("id"), Some("7"));

    assert_eq!(router.assemble("blog", &params(&[])).unwrap(), "/blog");
    assert_eq!(router.assemble("blog", &params(&[("page", "2")])).unwrap(), "/blog/2");
    assert_eq!(
        router
            .assemble("file", &params(&[("name", "a"), ("ext", "txt")]))
            .unwrap(),
        "/file/a.txt"
    );
}

#[test]
fn test_assemble_failures() {
    let router = site();
    assert!(matches!(
        router.assemble("missing", &params(&[])),
        Err(RoutingError::RouteNotFound(_))
    ));
    assert!(matches!(
        router.assemble("user", &params(&[])),
        Err(RoutingError::MissingParameter { .. })
    ));
}

#[test]
fn test_routes_are_shareable_across_threads() {
    let router = std::sync::Arc::new(site());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let router = std::sync::Arc::clone(&router);
            std::thread::spawn(move || {
                let path = format!("/user/{i}");
                router.match_path(&path).unwrap().unwrap().param("id").map(str::to_string)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(i.to_string()));
    }
}
