use super::*;

fn resolver() -> UrlResolver {
    UrlResolver::new(&AppConfig::defaults()).expect("client builds")
}

fn url(s: &str) -> Url {
    Url::parse(s).expect("test URL parses")
}

#[test]
fn classifies_every_recognized_shape() {
    let r = resolver();
    assert_eq!(r.classify(&url("https://naver.me/5GkXyZ1a")), UrlShape::ShortLink);
    assert_eq!(
        r.classify(&url(
            "https://map.naver.com/p/search/%EB%B9%84%EC%8A%A4%ED%8A%B8%EB%A1%9C/place/1826027582?c=15.00,0,0,0,dh"
        )),
        UrlShape::DesktopSearch
    );
    assert_eq!(
        r.classify(&url("https://map.naver.com/p/entry/place/1826027582")),
        UrlShape::DesktopEntry
    );
    assert_eq!(
        r.classify(&url("https://m.place.naver.com/restaurant/1826027582/home")),
        UrlShape::MobileCanonical
    );
    assert_eq!(
        r.classify(&url("https://pcmap.place.naver.com/place/1826027582/review/visitor")),
        UrlShape::MobileCanonical
    );
}

#[test]
fn foreign_hosts_are_unrecognized_even_with_a_place_path() {
    let r = resolver();
    assert_eq!(
        r.classify(&url("https://example.com/place/1826027582")),
        UrlShape::Unrecognized
    );
    assert_eq!(
        r.classify(&url("https://map.naver.com/p/search/coffee")),
        UrlShape::Unrecognized
    );
}

#[test]
fn place_id_requires_digits() {
    assert_eq!(
        place_id_from_path(&url("https://m.place.naver.com/restaurant/1826027582/menu/list")),
        Some(("1826027582".to_owned(), EntityType::Restaurant))
    );
    assert_eq!(
        place_id_from_path(&url("https://m.place.naver.com/place/abc123/home")),
        None
    );
    assert_eq!(
        place_id_from_path(&url("https://m.place.naver.com/hospital/1826027582/home")),
        None
    );
}

#[test]
fn canonical_url_uses_entity_segment() {
    assert_eq!(
        canonical_url("https://m.place.naver.com/", EntityType::Restaurant, "42"),
        "https://m.place.naver.com/restaurant/42/home"
    );
    assert_eq!(
        canonical_url("https://m.place.naver.com", EntityType::Generic, "42"),
        "https://m.place.naver.com/place/42/home"
    );
}

#[test]
fn input_tolerates_share_text_and_missing_scheme() {
    let shared = parse_input("[네이버 지도]\n비스트로 온더힐\nhttps://naver.me/5GkXyZ1a").expect("url found");
    assert_eq!(shared.as_str(), "https://naver.me/5GkXyZ1a");

    let bare = parse_input("  naver.me/5GkXyZ1a ").expect("scheme added");
    assert_eq!(bare.host_str(), Some("naver.me"));

    assert!(parse_input("").is_none());
    assert!(parse_input("not a link at all").is_none());
}

#[tokio::test]
async fn direct_shapes_resolve_to_the_same_id_without_network() {
    let r = resolver();
    let inputs = [
        "https://map.naver.com/p/search/bistro/place/1826027582?c=15.00,0,0,0,dh",
        "https://map.naver.com/p/entry/place/1826027582",
        "https://m.place.naver.com/place/1826027582/home",
    ];
    for input in inputs {
        let id = r.resolve(input).await.expect("resolves");
        assert_eq!(id.canonical_id, "1826027582", "input {input}");
        assert_eq!(id.raw_url, input);
        assert_eq!(
            id.canonical_url,
            "https://m.place.naver.com/place/1826027582/home"
        );
    }
}

#[tokio::test]
async fn resolving_the_canonical_url_is_idempotent() {
    let r = resolver();
    let first = r
        .resolve("https://m.place.naver.com/restaurant/1826027582/review/visitor")
        .await
        .expect("resolves");
    let second = r.resolve(&first.canonical_url).await.expect("resolves");
    assert_eq!(first.canonical_id, second.canonical_id);
    assert_eq!(first.entity_type, second.entity_type);
    assert_eq!(first.canonical_url, second.canonical_url);
}

#[tokio::test]
async fn uppercase_scheme_is_accepted() {
    let r = resolver();
    for input in [
        "HTTPS://m.place.naver.com/restaurant/1826027582/home",
        "Bistro on the corner Http://m.place.naver.com/restaurant/1826027582/home",
    ] {
        let id = r.resolve(input).await.expect("resolves");
        assert_eq!(id.canonical_id, "1826027582", "input {input}");
        assert_eq!(id.entity_type, EntityType::Restaurant);
    }
}

#[tokio::test]
async fn unrecognized_input_is_invalid_url() {
    let r = resolver();
    for input in ["https://www.google.com/maps/place/123", "hello", ""] {
        let err = r.resolve(input).await.unwrap_err();
        assert!(
            matches!(err, ExtractError::InvalidUrl { .. }),
            "{input}: {err:?}"
        );
    }
}
