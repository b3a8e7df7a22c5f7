use crate::storage::{ClickEvent, Link};
use migration::entities::{click_event, link};

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        short_code: model.short_code,
        original_url: model.original_url,
        owner_id: model.owner_id,
        created_at: model.created_at,
        expiration_date: model.expiration_date,
        click_count: model.click_count.max(0) as u64,
    }
}

pub fn link_to_active_model(link: &Link) -> link::ActiveModel {
    use sea_orm::ActiveValue::Set;

    link::ActiveModel {
        id: Set(link.id.clone()),
        short_code: Set(link.short_code.clone()),
        original_url: Set(link.original_url.clone()),
        owner_id: Set(link.owner_id.clone()),
        created_at: Set(link.created_at),
        expiration_date: Set(link.expiration_date),
        click_count: Set(link.click_count.min(i64::MAX as u64) as i64),
    }
}

pub fn model_to_click(model: click_event::Model) -> ClickEvent {
    ClickEvent {
        clicked_at: model.clicked_at,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        referrer: model.referrer,
    }
}

/// id 交给数据库自增
pub fn click_to_active_model(link_id: &str, event: &ClickEvent) -> click_event::ActiveModel {
    use sea_orm::ActiveValue::{NotSet, Set};

    click_event::ActiveModel {
        id: NotSet,
        link_id: Set(link_id.to_string()),
        clicked_at: Set(event.clicked_at),
        ip_address: Set(event.ip_address.clone()),
        user_agent: Set(event.user_agent.clone()),
        referrer: Set(event.referrer.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    #[test]
    fn test_model_to_link_clamps_negative_clicks() {
        let model = link::Model {
            id: "3f0e".to_string(),
            short_code: "abc1234".to_string(),
            original_url: "https://example.com".to_string(),
            owner_id: "u1".to_string(),
            created_at: Utc::now(),
            expiration_date: None,
            click_count: -3,
        };

        let link = model_to_link(model);
        assert_eq!(link.click_count, 0);
        assert_eq!(link.short_code, "abc1234");
    }

    #[test]
    fn test_click_active_model_leaves_id_unset() {
        let event = ClickEvent {
            clicked_at: Utc::now(),
            ip_address: Some("203.0.113.9".to_string()),
            user_agent: None,
            referrer: Some("https://news.ycombinator.com/".to_string()),
        };

        let active = click_to_active_model("link-1", &event);
        assert!(matches!(active.id, ActiveValue::NotSet));
        assert!(matches!(active.link_id, ActiveValue::Set(ref id) if id == "link-1"));
        assert!(matches!(active.user_agent, ActiveValue::Set(None)));
    }
}
