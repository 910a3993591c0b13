//! Advance command - Move to the next step

use std::path::Path;

use crate::errors::Result;

use super::{print_json, Workspace};

/// Leave the validated step; on the last step this closes the journey
pub async fn run(cwd: Option<&Path>, owner: &str, json: bool) -> Result<()> {
    let workspace = Workspace::open(cwd)?;
    let journey = workspace.existing_journey(owner).await?;
    let advance = workspace.progression().move_to_next_step(journey.id).await?;

    if json {
        return print_json(&advance);
    }
    if advance.complete {
        println!("Journey {} completed", journey.id);
    } else {
        println!("Now at {} ({})", advance.state.step.title(), advance.state);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::{initialized_root, root_of};
    use crate::cli::commands::{file, validate};
    use crate::schemas::{JourneyState, Status, Step};

    #[tokio::test]
    async fn test_file_validate_advance_round() {
        let temp = initialized_root().await;
        file::run(root_of(&temp), "citizen-1", Some("1"), false)
            .await
            .unwrap();
        validate::run(root_of(&temp), "citizen-1", false).await.unwrap();
        run(root_of(&temp), "citizen-1", true).await.unwrap();

        let workspace = Workspace::open(root_of(&temp)).unwrap();
        let journey = workspace.existing_journey("citizen-1").await.unwrap();
        assert_eq!(journey.state(), JourneyState::new(Step::Eligibilite, Status::Todo));
    }

    #[tokio::test]
    async fn test_advance_unknown_owner_is_not_found() {
        let temp = initialized_root().await;
        let err = run(root_of(&temp), "nobody", false).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_validate_twice_is_rejected() {
        let temp = initialized_root().await;
        file::run(root_of(&temp), "citizen-1", None, false).await.unwrap();
        validate::run(root_of(&temp), "citizen-1", false).await.unwrap();

        let err = validate::run(root_of(&temp), "citizen-1", false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }
}
