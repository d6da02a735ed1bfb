use anyhow::Result;
use serde::Serialize;

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use crate::builder::complete::constructed_profile;
    use crate::output::json::render_json;

    #[test]
    fn profiles_render_without_internal_text() {
        let profile = constructed_profile("aggro").expect("aggro");
        let value: serde_json::Value =
            serde_json::from_str(&render_json(profile).expect("json")).expect("parse");
        assert_eq!(value["land_count"], 20);
        assert_eq!(value["curve_targets"][0], serde_json::json!([1, 10]));
        assert!(value.get("mulligan").is_none());
    }
}
