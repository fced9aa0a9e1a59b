use crate::utility::embeds::{
    grouped_help_description, no_commands_message, unknown_category_message,
};
use crate::{COMMANDS, CommandMeta};
use lantern_core::{Context, Error};
use lantern_utils::COMMAND_PREFIX;
use lantern_utils::embed::build_list_embed;

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help [category]",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Category to filter by"] category: Option<String>,
) -> Result<(), Error> {
    let category = category.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let mut categories: Vec<&str> = COMMANDS.iter().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();

    if let Some(wanted_category) = category
        && !categories.contains(&wanted_category)
    {
        ctx.say(unknown_category_message(wanted_category, &categories))
            .await?;
        return Ok(());
    }

    let commands = sorted_commands(category);
    if commands.is_empty() {
        ctx.say(no_commands_message(category)).await?;
        return Ok(());
    }

    let footer = format!("Prefix: {}", COMMAND_PREFIX);
    let embed = build_list_embed(
        "Available Commands",
        grouped_help_description(&commands),
        Some(&footer),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn sorted_commands(category: Option<&str>) -> Vec<&'static CommandMeta> {
    let mut filtered: Vec<&'static CommandMeta> = COMMANDS
        .iter()
        .filter(|cmd| match category {
            Some(wanted) => cmd.category == wanted,
            None => true,
        })
        .collect();

    filtered.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorting_groups_by_category_then_name() {
        let commands = sorted_commands(None);
        let mut seen = commands.clone();
        seen.sort_unstable_by(|left, right| {
            left.category
                .cmp(right.category)
                .then_with(|| left.name.cmp(right.name))
        });
        assert_eq!(
            commands.iter().map(|c| c.name).collect::<Vec<_>>(),
            seen.iter().map(|c| c.name).collect::<Vec<_>>()
        );
        assert!(!commands.is_empty());
    }

    #[test]
    fn category_filter_excludes_other_categories() {
        let commands = sorted_commands(Some("utility"));
        assert!(commands.iter().all(|c| c.category == "utility"));
        assert!(commands.iter().any(|c| c.name == "ping"));
    }
}
