//! Short-link resolution against a local `wiremock` server.

mod support;

use placegrab_core::EntityType;
use placegrab_scraper::{ExtractError, UrlResolver};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{short_link, test_config, PLACE_ID};

fn resolver(server: &MockServer) -> UrlResolver {
    UrlResolver::new(&test_config(server)).expect("resolver builds")
}

async fn mount_redirect(server: &MockServer, code: &str, location: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{code}")))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", location))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn short_link_resolves_to_same_id_as_every_other_shape() {
    let server = MockServer::start().await;
    mount_redirect(
        &server,
        "5GkXyZ1a",
        "https://m.place.naver.com/restaurant/1826027582/home?entry=ple",
    )
    .await;
    let resolver = resolver(&server);

    let via_short = resolver
        .resolve(&short_link(&server, "5GkXyZ1a"))
        .await
        .expect("short link resolves");

    for other in [
        "https://map.naver.com/p/search/bistro/place/1826027582?c=15.00,0,0,0,dh",
        "https://map.naver.com/p/entry/place/1826027582",
        "https://m.place.naver.com/restaurant/1826027582/home",
    ] {
        let id = resolver.resolve(other).await.expect("resolves");
        assert_eq!(id.canonical_id, via_short.canonical_id, "{other}");
    }

    assert_eq!(via_short.canonical_id, PLACE_ID);
    assert_eq!(via_short.entity_type, EntityType::Restaurant);
    assert_eq!(
        via_short.canonical_url,
        format!("{}/restaurant/{PLACE_ID}/home", server.uri())
    );
}

#[tokio::test]
async fn relative_location_back_onto_the_short_link_host_is_invalid() {
    let server = MockServer::start().await;
    // The redirect stays on the short-link host, which is not a place host.
    mount_redirect(&server, "rel", "/place/1826027582/home").await;

    let err = resolver(&server)
        .resolve(&short_link(&server, "rel"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidUrl { .. }), "{err:?}");
}

#[tokio::test]
async fn short_link_answering_200_is_a_resolution_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let err = resolver(&server)
        .resolve(&short_link(&server, "plain"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ExtractError::ResolutionFailed { ref reason, .. } if reason.contains("200")),
        "{err:?}"
    );
}

#[tokio::test]
async fn redirect_without_location_is_a_resolution_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nolocation"))
        .respond_with(ResponseTemplate::new(301))
        .mount(&server)
        .await;

    let err = resolver(&server)
        .resolve(&short_link(&server, "nolocation"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::ResolutionFailed { .. }), "{err:?}");
}

#[tokio::test]
async fn redirect_to_a_non_place_page_is_invalid() {
    let server = MockServer::start().await;
    mount_redirect(&server, "promo", "https://www.naver.com/").await;

    let err = resolver(&server)
        .resolve(&short_link(&server, "promo"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::InvalidUrl { .. }), "{err:?}");
}

#[tokio::test]
async fn only_one_redirect_hop_is_followed() {
    let server = MockServer::start().await;
    let second_hop = short_link(&server, "hop2");
    mount_redirect(&server, "hop1", &second_hop).await;

    let err = resolver(&server)
        .resolve(&short_link(&server, "hop1"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ExtractError::InvalidUrl { ref reason, .. } if reason.contains("another short link")),
        "{err:?}"
    );
}

#[tokio::test]
async fn unreachable_short_link_host_is_a_resolution_failure() {
    let server = MockServer::start().await;
    let config = test_config(&server);
    let dead_link = short_link(&server, "gone");
    drop(server);

    let err = UrlResolver::new(&config)
        .unwrap()
        .resolve(&dead_link)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::ResolutionFailed { .. }), "{err:?}");
}
