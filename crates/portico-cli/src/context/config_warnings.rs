use portico_config::PorticoConfig;

/// Section names that env vars must separate with `__`.
const SECTIONS: [&str; 3] = ["PORTAL", "SYNC", "CATALOG"];

/// Emit warnings for missing OAuth settings and likely mistyped env var keys.
pub fn warn_unconfigured(config: &PorticoConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &PorticoConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    let missing = config.portal.missing_fields();
    if !missing.is_empty() {
        warnings.push(format!(
            "portal OAuth client is not configured (missing: {}). Set them in portico.toml or as PORTICO_PORTAL__<KEY>.",
            missing.join(", ")
        ));
    }

    for section in SECTIONS {
        let single = format!("PORTICO_{section}_");
        let double = format!("PORTICO_{section}__");
        if env_keys
            .iter()
            .any(|key| key.starts_with(&single) && !key.starts_with(&double))
        {
            warnings.push(format!(
                "{section} config env vars use a single underscore and are ignored. Use double underscores (example: PORTICO_{section}__{}).",
                example_key(section)
            ));
        }
    }

    warnings
}

fn example_key(section: &str) -> &'static str {
    match section {
        "PORTAL" => "CLIENT_ID",
        "SYNC" => "FREQUENCY__MINUTES",
        _ => "INGEST_URL",
    }
}
