use std::collections::HashMap;

use fluent::bundle::FluentBundle;
use fluent::{FluentArgs, FluentResource, FluentValue};
use intl_memoizer::concurrent::IntlLangMemoizer;
use rust_embed::RustEmbed;
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "locales"]
struct Locales;

// concurrent memoizer so the bundles can live in a shared static
type Bundle = FluentBundle<FluentResource, IntlLangMemoizer>;

const LANGS: [&str; 2] = ["en", "ru"];

lazy_static::lazy_static! {
    static ref BUNDLES: HashMap<String, Bundle> = load_bundles();
}

fn load_bundles() -> HashMap<String, Bundle> {
    let mut bundles = HashMap::new();

    for lang in LANGS {
        let Some(file) = Locales::get(&format!("{lang}/main.ftl")) else {
            continue;
        };
        let Ok(source) = std::str::from_utf8(&file.data) else {
            continue;
        };
        let Ok(resource) = FluentResource::try_new(source.to_string()) else {
            continue;
        };

        let lang_id: LanguageIdentifier = lang.parse().unwrap_or_else(|_| "en".parse().unwrap());
        let mut bundle = Bundle::new_concurrent(vec![lang_id]);
        // no Unicode isolation marks, they garble the terminal table
        bundle.set_use_isolating(false);
        let _ = bundle.add_resource(resource);
        bundles.insert(lang.to_string(), bundle);
    }

    bundles
}

/// Get a localized string; unknown languages fall back to English and
/// unknown keys come back verbatim.
pub fn get_string(lang: &str, key: &str, args: Option<&FluentArgs>) -> String {
    let Some(bundle) = BUNDLES.get(lang).or_else(|| BUNDLES.get("en")) else {
        return key.to_string();
    };
    let Some(message) = bundle.get_message(key) else {
        return key.to_string();
    };
    let Some(pattern) = message.value() else {
        return key.to_string();
    };

    let mut errors = vec![];
    bundle.format_pattern(pattern, args, &mut errors).to_string()
}

/// Helper to get a string without arguments
pub fn t(lang: &str, key: &str) -> String {
    get_string(lang, key, None)
}

/// Helper to get a string with arguments
pub fn t_with_args(lang: &str, key: &str, args: &[(&str, String)]) -> String {
    let mut fluent_args = FluentArgs::new();
    for (name, value) in args {
        fluent_args.set(*name, FluentValue::from(value.clone()));
    }
    get_string(lang, key, Some(&fluent_args))
}

/// Detect the UI language from the environment (LC_ALL, then LANG).
pub fn detect_system_language() -> String {
    for var in ["LC_ALL", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            let value = value.to_ascii_lowercase();
            if value.starts_with("ru") {
                return "ru".to_string();
            }
            if value.starts_with("en") {
                return "en".to_string();
            }
        }
    }
    "en".to_string()
}
