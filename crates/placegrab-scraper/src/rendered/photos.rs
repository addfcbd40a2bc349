//! Photo URL selection and the photo sub-route.

use std::collections::HashSet;

use placegrab_core::{PhotoFilterParam, PhotoRules, PhotoUpgradeRule};
use reqwest::Url;

/// Derives the photo sub-route from a canonical page URL: the trailing path
/// segment becomes `photo` and the filter parameter (if any) is appended.
///
/// `https://m.place.naver.com/restaurant/42/home`
/// → `https://m.place.naver.com/restaurant/42/photo?filterType=%EC%97%85%EC%B2%B4%EC%82%AC%EC%A7%84`
#[must_use]
pub fn photo_route(canonical_url: &str, filter: Option<&PhotoFilterParam>) -> String {
    let Ok(mut url) = Url::parse(canonical_url) else {
        return canonical_url.to_owned();
    };

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().pop().push("photo");
    }
    url.set_query(None);
    if let Some(filter) = filter {
        url.query_pairs_mut().append_pair(&filter.name, &filter.value);
    }
    url.to_string()
}

/// Filters raw `<img>` sources down to listing photos.
///
/// Applied in order: allow-listed CDN host, blocked path keywords, minimum
/// URL length, resolution upgrade, order-preserving de-duplication and the
/// `max_photos` cap. De-duplication runs after the upgrade so that two
/// renditions of the same image collapse into one.
#[must_use]
pub fn select_photos(raw: &[String], rules: &PhotoRules) -> Vec<String> {
    let allowed: Vec<String> = rules
        .allowed_hosts
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let blocked: Vec<String> = rules
        .blocked_keywords
        .iter()
        .map(|k| k.trim().to_ascii_lowercase())
        .collect();

    let mut seen = HashSet::new();
    raw.iter()
        .map(|src| src.trim())
        .filter(|src| src.len() >= rules.min_url_length)
        .filter_map(|src| Url::parse(src).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .filter(|url| {
            url.host_str()
                .is_some_and(|host| allowed.iter().any(|a| host.to_ascii_lowercase().contains(a.as_str())))
        })
        .filter(|url| {
            let path = url.path().to_ascii_lowercase();
            !blocked.iter().any(|k| path.contains(k.as_str()))
        })
        .map(|url| match &rules.upgrade {
            Some(rule) => upgrade(url, rule),
            None => url,
        })
        .map(String::from)
        .filter(|url| seen.insert(url.clone()))
        .take(rules.max_photos)
        .collect()
}

/// Sets `rule.param` to `rule.value`, replacing an existing value or
/// appending the parameter.
fn upgrade(mut url: Url, rule: &PhotoUpgradeRule) -> Url {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            if k == rule.param.as_str() {
                replaced = true;
                (k.into_owned(), rule.value.clone())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &pairs {
            query.append_pair(k, v);
        }
        if !replaced {
            query.append_pair(&rule.param, &rule.value);
        }
    }
    url
}

#[cfg(test)]
#[path = "photos_test.rs"]
mod tests;
