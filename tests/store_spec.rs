use speculate2::speculate;
use trait_mapper::models::*;
use trait_mapper::store::{self, AppSettings, SettingsStore, StoreError};

const LEGACY_FILE: &str = r##"{
  "Name": "Old Map",
  "Characters": [
    {
      "Name": "Ada",
      "ColorHex": "#BF4C4C",
      "Size": 2,
      "DisplayOrder": 0,
      "TraitPositions": { "Warmth": 0.2, "Emotional Stability": 0.9 }
    },
    {
      "Name": "Ben",
      "ColorHex": "#4C7FBF",
      "Size": 0,
      "DisplayOrder": 1,
      "TraitPositions": { "Intellect": 1.7 }
    },
    {
      "Name": "Cy",
      "ColorHex": "#808080",
      "Size": 2,
      "DisplayOrder": 2
    }
  ]
}"##;

fn sample_project() -> Project {
    let mut project = Project::named("Saga");
    let ada = project.add_character(Character::new("Ada", "#BF4C4C", BubbleSize::Large));
    project.add_character(Character::new("Ben", "#4C7FBF", BubbleSize::Small));
    project.characters[ada].set_trait_position("Warmth", 0.8);
    project.characters[ada].questionnaire_answers.insert("Q_Warmth_1".to_string(), 4);
    project.characters[ada].questionnaire_exclusions.push("Distrust".to_string());
    project.set_note("Warmth", "Thaws slowly");
    project
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
    }

    describe "project files" {
        it "round trips a saved project" {
            let path = dir.path().join("saga.16core");
            let project = sample_project();
            store::save(&project, &path).expect("Failed to save");

            let loaded = store::load(&path).expect("Failed to load");
            assert_eq!(loaded.name, "Saga");
            assert_eq!(loaded.format_version, FORMAT_VERSION);
            assert_eq!(loaded.characters.len(), 2);
            assert_eq!(loaded.note("Warmth"), Some("Thaws slowly"));

            let ada = &loaded.characters[0];
            assert_eq!(ada.trait_positions.get("Warmth"), Some(&0.8));
            assert_eq!(ada.trait_positions.len(), TRAIT_COUNT);
            assert_eq!(ada.questionnaire_answers.get("Q_Warmth_1"), Some(&4));
            assert_eq!(ada.questionnaire_exclusions, vec!["Distrust".to_string()]);
        }

        it "writes PascalCase fields and the size as a name" {
            let json = store::to_json(&sample_project()).expect("Failed to serialize");
            assert!(json.contains("\"FormatVersion\": 2"));
            assert!(json.contains("\"TraitNotes\""));
            assert!(json.contains("\"Size\": \"Large\""));
        }

        it "creates missing parent directories" {
            let path = dir.path().join("nested").join("deeper").join("map.16core");
            store::save(&Project::new(), &path).expect("Failed to save");
            assert!(path.exists());
        }

        it "recognizes project extensions" {
            assert!(store::is_project_path(std::path::Path::new("a.16core")));
            assert!(store::is_project_path(std::path::Path::new("a.JSON")));
            assert!(!store::is_project_path(std::path::Path::new("a.txt")));
        }
    }

    describe "legacy files" {
        before {
            let project = store::from_json(LEGACY_FILE).expect("Failed to parse legacy file");
        }

        it "defaults the missing fields" {
            assert_eq!(project.format_version, 1);
            assert!(project.trait_notes.is_empty());
            assert_eq!(project.selected_language, "en");
            assert!(project.characters.iter().all(|c| c.is_visible && !c.is_locked));
        }

        it "reads integer size codes" {
            let sizes: Vec<_> = project.characters.iter().map(|c| c.size).collect();
            assert_eq!(sizes, vec![BubbleSize::Large, BubbleSize::Small, BubbleSize::Large]);
        }

        it "renumbers global display orders per group" {
            let main: Vec<_> = project.group(BubbleSize::Large).iter().map(|c| (c.name.as_str(), c.display_order)).collect();
            assert_eq!(main, vec![("Ada", 0), ("Cy", 1)]);
            assert_eq!(project.group(BubbleSize::Small)[0].display_order, 0);
        }

        it "clamps stored positions" {
            assert_eq!(project.characters[1].trait_positions.get("Intellect"), Some(&1.0));
        }

        it "migrates name-keyed positions when saved" {
            let path = dir.path().join("old.16core");
            store::save(&project, &path).expect("Failed to save");
            let reloaded = store::load(&path).expect("Failed to load");

            let ada = &reloaded.characters[0];
            assert_eq!(ada.trait_positions.get("EmotionalStability"), Some(&0.9));
            assert!(!ada.trait_positions.contains_key("Emotional Stability"));
            assert_eq!(reloaded.format_version, FORMAT_VERSION);
        }

        it "reads null collections as empty" {
            let json = r#"{
                "Name": "Nulls",
                "Characters": [{
                    "Name": "Eve",
                    "TraitPositions": null,
                    "QuestionnaireAnswers": null,
                    "QuestionnaireExclusions": null
                }],
                "TraitNotes": null
            }"#;
            let project = store::from_json(json).expect("Failed to parse");
            assert!(project.trait_notes.is_empty());
            let eve = &project.characters[0];
            assert!(eve.trait_positions.is_empty());
            assert!(eve.questionnaire_answers.is_empty());
            assert!(eve.questionnaire_exclusions.is_empty());

            let empty = store::from_json(r#"{"Name": "Bare", "Characters": null}"#).expect("Failed to parse");
            assert!(!empty.has_characters());
        }

        it "accepts camelCase field names" {
            let json = r#"{"name":"Camel","characters":[{"name":"Dee","size":"Medium","isLocked":true}]}"#;
            let project = store::from_json(json).expect("Failed to parse");
            assert_eq!(project.name, "Camel");
            assert_eq!(project.characters[0].size, BubbleSize::Medium);
            assert!(project.characters[0].is_locked);
        }
    }

    describe "broken files" {
        it "reports malformed JSON" {
            assert!(matches!(store::from_json("{ not json"), Err(StoreError::Parse(_))));
        }

        it "reports a null document as empty" {
            assert!(matches!(store::from_json("null"), Err(StoreError::Empty)));
        }

        it "rejects files from a newer format" {
            let result = store::from_json(r#"{"FormatVersion": 99}"#);
            assert!(matches!(result, Err(StoreError::UnsupportedVersion { found: 99, .. })));
        }

        it "falls back to an empty project" {
            let path = dir.path().join("broken.16core");
            std::fs::write(&path, "garbage").expect("Failed to write");

            let (project, error) = store::load_or_new(&path);
            assert!(error.is_some());
            assert!(!project.has_characters());
        }

        it "reports a missing file as an io error" {
            let result = store::load(&dir.path().join("missing.16core"));
            assert!(matches!(result, Err(StoreError::Io { .. })));
        }
    }

    describe "settings" {
        before {
            let settings = SettingsStore::in_dir(dir.path());
        }

        it "defaults when nothing was saved" {
            assert_eq!(settings.load(), AppSettings::default());
        }

        it "persists the chosen language" {
            let chosen = AppSettings { is_dark_mode: false, language_code: "de".to_string() };
            assert!(settings.save(&chosen));
            assert_eq!(settings.load(), chosen);
        }
    }
}
