//! Write a starter scenario.

use std::path::PathBuf;

use anyhow::Context;

const TEMPLATE: &str = r##"{
  "name": "My demo",
  "description": "Open a page and show off one interaction",
  "viewport": { "width": 1280, "height": 800 },
  "effects": {
    "zoom": { "enabled": true, "scale": 1.8, "duration": 600 },
    "cursor": { "enabled": true, "clickEffect": true },
    "background": { "type": "gradient", "padding": 60, "borderRadius": 12, "shadow": true },
    "deviceFrame": { "enabled": true, "type": "browser" }
  },
  "output": {
    "format": "gif",
    "width": 1280,
    "height": 800,
    "fps": 15,
    "quality": 80,
    "outputDir": "./output",
    "filename": "democast-recording"
  },
  "steps": [
    {
      "name": "Open the page",
      "actions": [{ "action": "navigate", "url": "https://example.com", "waitUntil": "networkidle" }],
      "holdDuration": 1000
    },
    {
      "name": "Follow the link",
      "actions": [{ "action": "click", "selector": "a" }],
      "holdDuration": 1500,
      "transition": "fade"
    }
  ]
}
"##;

pub fn run(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, TEMPLATE).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Scenario written to {}", path.display());
    println!();
    println!("Next steps:");
    println!("  democast validate {}", path.display());
    println!("  democast record {} --dry-run", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use democast_model::{validate, Scenario};

    #[test]
    fn test_template_is_valid() {
        let scenario = Scenario::from_json_str(TEMPLATE).unwrap();
        let report = validate(&scenario);
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("demo.json");
        run(path.clone(), false).unwrap();
        assert!(run(path.clone(), false).is_err());
        run(path, true).unwrap();
    }
}
