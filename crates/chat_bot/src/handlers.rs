use teloxide::{prelude::*, types::User};

use crate::ConfigParameters;

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    let sender = sender_id(msg.chat.id);
    if let Some(reply) = cfg.dispatcher.handle(&sender, text).await {
        bot.send_message(msg.chat.id, reply).await?;
    }
    Ok(())
}

/// Sessions are keyed by chat, so a group shares one report flow.
fn sender_id(chat_id: ChatId) -> String {
    format!("telegram:{}", chat_id.0)
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_ids_are_namespaced_by_transport() {
        assert_eq!(sender_id(ChatId(-100_123)), "telegram:-100123");
    }
}
