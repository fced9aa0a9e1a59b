use crate::CommandMeta;

pub fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid
    )
}

pub fn no_commands_message(category: Option<&str>) -> String {
    match category {
        Some(cat) => format!("No commands found in category: {}", display_category(cat)),
        None => "No commands found at all. (This probably means something is broken)".to_owned(),
    }
}

pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        out.push_str(&format!("`{}`: {}\n", command.name, command.desc));
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_emits_one_header_per_category() {
        let ping = CommandMeta {
            name: "ping",
            desc: "Replies with Pong!",
            category: "utility",
            usage: "!ping",
        };
        let warn = CommandMeta {
            name: "warn",
            desc: "Warn a user.",
            category: "moderation",
            usage: "!warn",
        };
        let kick = CommandMeta {
            name: "kick",
            desc: "Kick a user.",
            category: "moderation",
            usage: "!kick",
        };

        let out = grouped_help_description(&[&kick, &warn, &ping]);
        assert_eq!(out.matches("**Moderation**").count(), 1);
        assert_eq!(out.matches("**Utility**").count(), 1);
        assert!(out.contains("`warn`: Warn a user."));
    }

    #[test]
    fn unknown_category_lists_valid_ones() {
        let message = unknown_category_message("musik", &["moderation", "utility"]);
        assert!(message.contains("Musik"));
        assert!(message.contains("Moderation, Utility"));
    }
}
