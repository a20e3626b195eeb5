//! Architecture contract tests.

mod support;

use support::architecture::{find_lines_containing, path_exists};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &["crate::adapter", "crate::infrastructure", "crate::application"],
    );

    assert!(hits.is_empty(), "ports import outer layers: {hits:#?}");
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_containing(
        "src/application",
        &["crate::adapter::", "crate::infrastructure::"],
    );
    assert!(
        hits.is_empty(),
        "application layer should not import adapters directly: {hits:#?}"
    );
}

#[test]
fn providers_never_touch_cache_or_coalescing() {
    let hits = find_lines_containing(
        "src/adapter/outbound/provider",
        &["CacheStore", "Coalescer", "crate::application"],
    );
    assert!(
        hits.is_empty(),
        "providers must stay independent of caching: {hits:#?}"
    );
}

#[test]
fn cli_has_no_direct_infrastructure_imports() {
    let hits = find_lines_containing(
        "src/adapter/inbound/cli",
        &["use crate::infrastructure", "crate::infrastructure::"],
    );

    assert!(
        hits.is_empty(),
        "found direct infrastructure imports in inbound CLI adapters: {hits:#?}"
    );
}

#[test]
fn vendor_payload_types_stay_inside_their_adapter() {
    let hits = find_lines_containing("src", &["polygon::dto", "yahoo::dto"]);
    let leaked: Vec<_> = hits
        .into_iter()
        .filter(|(path, _, _)| !path.starts_with("src/adapter/outbound/provider/"))
        .collect();
    assert!(leaked.is_empty(), "vendor DTOs leaked: {leaked:#?}");
}

#[test]
fn composition_root_lives_in_infrastructure() {
    assert!(path_exists("src/infrastructure/factory/gateway.rs"));
    assert!(path_exists("src/infrastructure/config/settings.rs"));
}
