use std::path::Path;

use chrono::Utc;
use proptest::prelude::*;

use skillsync::core::{Platform, Scope};
use skillsync::parser::{SkillParser, SkillSerializer};

fn body_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z ]{0,20}", 1..8).prop_map(|lines| {
        let mut body = lines.join("\n");
        body.push('\n');
        body
    })
}

fn front_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(
        (
            "Use [a-z]{3,10}( [a-z]{3,10}){0,3}",
            prop::collection::vec(prop::sample::select(vec!["Read", "Grep", "Bash", "Edit"]), 0..3),
        )
            .prop_map(|(description, tools)| {
                let mut front = format!("---\ndescription: {description}\n");
                if !tools.is_empty() {
                    front.push_str(&format!("tools: [{}]\n", tools.join(", ")));
                }
                front.push_str("---\n");
                front
            }),
    )
}

proptest! {
    #[test]
    fn test_parse_then_serialize_is_identity(front in front_strategy(), body in body_strategy()) {
        let text = format!("{}{body}", front.unwrap_or_default());
        let skill = SkillParser::parse_str(
            &text,
            Path::new("/skills/prop/SKILL.md"),
            Platform::ClaudeCode,
            Scope::User,
            Utc::now(),
        )
        .unwrap();
        prop_assert_eq!(&skill.name, "prop");
        prop_assert_eq!(SkillSerializer::to_string(&skill).unwrap(), text);
    }

    #[test]
    fn test_crlf_documents_survive_round_trip(body in body_strategy()) {
        let text = format!("---\ndescription: Use crlf\n---\n{body}").replace('\n', "\r\n");
        let skill = SkillParser::parse_str(
            &text,
            Path::new("/skills/crlf.md"),
            Platform::Cursor,
            Scope::Repo,
            Utc::now(),
        )
        .unwrap();
        prop_assert_eq!(&skill.description, "Use crlf");
        prop_assert_eq!(SkillSerializer::to_string(&skill).unwrap(), text);
    }
}
