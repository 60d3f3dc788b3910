use crate::errors::{PlanningError, Result};
use crate::extraction::{EpicExtraction, StoryExtraction};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const BUSINESS_VALUE_MAX_CHARS: usize = 2000;
pub const USER_STORY_FIELD_MAX_CHARS: usize = 1000;

/// Validate every extracted Epic
///
/// # Errors
/// Returns the first violation found, in payload order. Nothing has been
/// written when this fails.
pub fn validate_epics(epics: &[EpicExtraction]) -> Result<()> {
    for epic in epics {
        let entity = format!("epic {}", epic.number);
        positive(&entity, "number", epic.number)?;
        title(&entity, &epic.title)?;
        bounded(&entity, "description", &epic.description, DESCRIPTION_MAX_CHARS)?;
        if let Some(value) = &epic.business_value {
            bounded(&entity, "businessValue", value, BUSINESS_VALUE_MAX_CHARS)?;
        }
        if let Some(sprint) = epic.target_sprint {
            positive(&entity, "targetSprint", sprint)?;
        }
    }
    Ok(())
}

/// Validate every extracted Story
///
/// # Errors
/// Returns the first violation found, in payload order.
pub fn validate_stories(stories: &[StoryExtraction]) -> Result<()> {
    for story in stories {
        let entity = format!("story {}", story.key());
        positive(&entity, "epicNumber", story.epic_number)?;
        positive(&entity, "storyNumber", story.story_number)?;
        title(&entity, &story.title)?;
        required(&entity, "asA", &story.as_a)?;
        required(&entity, "iWant", &story.i_want)?;
        required(&entity, "soThat", &story.so_that)?;
        if let Some(description) = &story.description {
            bounded(&entity, "description", description, DESCRIPTION_MAX_CHARS)?;
        }
        if let Some(sprint) = story.target_sprint {
            positive(&entity, "targetSprint", sprint)?;
        }
    }
    Ok(())
}

fn positive(entity: &str, field: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(PlanningError::InvalidNumber {
            entity: entity.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

fn title(entity: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlanningError::InvalidTitle {
            entity: entity.to_string(),
            reason: "Title cannot be empty".to_string(),
        });
    }
    let len = value.chars().count();
    if len > TITLE_MAX_CHARS {
        return Err(PlanningError::InvalidTitle {
            entity: entity.to_string(),
            reason: format!("Title is {} chars, limit is {}", len, TITLE_MAX_CHARS),
        });
    }
    Ok(())
}

fn required(entity: &str, field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlanningError::MissingField {
            entity: entity.to_string(),
            field,
        });
    }
    bounded(entity, field, value, USER_STORY_FIELD_MAX_CHARS)
}

fn bounded(entity: &str, field: &'static str, value: &str, max: usize) -> Result<()> {
    let actual = value.chars().count();
    if actual > max {
        return Err(PlanningError::FieldTooLong {
            entity: entity.to_string(),
            field,
            max,
            actual,
        });
    }
    Ok(())
}
