#[cfg(test)]
mod tests {
    use crate::db::{
        create_match, create_player, create_team, create_venue, delete_match, delete_team,
        delete_venue, get_all_matches, get_all_players, get_all_teams, get_match, get_player,
        get_team, update_match, update_player, update_team, update_venue,
    };
    use crate::error::AppError;
    use crate::models::{MatchInput, PlayerInput, TeamInput, VenueInput};
    use crate::test::test_utils::{TestDbBuilder, create_standard_test_db};
    use chrono::{NaiveDate, NaiveTime};

    fn eagles() -> TeamInput {
        TeamInput {
            name: "Eagles".to_string(),
            coach: "Alex Morgan".to_string(),
            founded_year: 1990,
        }
    }

    fn match_input(team_id: i64, venue_id: i64) -> MatchInput {
        MatchInput {
            team_id,
            opponent: "Falcons".to_string(),
            venue_id,
            date: "2024-03-15".to_string(),
            time: "19:30".to_string(),
            duration: 80,
            description: Some("  Cup quarter-final ".to_string()),
            invited_count: 30,
            accepted_count: 12,
        }
    }

    #[rocket::async_test]
    async fn test_duplicate_team_name_is_rejected() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        create_team(&test_db.pool, &eagles())
            .await
            .expect("Failed to create team");

        let result = create_team(&test_db.pool, &eagles()).await;
        assert!(
            matches!(result, Err(AppError::Uniqueness(ref msg)) if msg.contains("teams.name")),
            "Creating duplicate team should fail with a uniqueness error, got {:?}",
            result
        );

        let teams = get_all_teams(&test_db.pool).await.expect("Failed to list");
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].name, "Eagles");
    }

    #[rocket::async_test]
    async fn test_update_team_replaces_fields() {
        let test_db = create_standard_test_db().await;
        let id = test_db.team_id("Eagles");

        let updated = update_team(
            &test_db.pool,
            id,
            &TeamInput {
                name: "Golden Eagles".to_string(),
                coach: "Jo Bloggs".to_string(),
                founded_year: 1991,
            },
        )
        .await
        .expect("Failed to update team");

        assert_eq!(updated.id, id);
        assert_eq!(updated.name, "Golden Eagles");
        assert_eq!(updated.coach, "Jo Bloggs");
        assert_eq!(updated.founded_year, 1991);
    }

    #[rocket::async_test]
    async fn test_update_team_to_taken_name_leaves_store_unchanged() {
        let test_db = create_standard_test_db().await;
        let hawks_id = test_db.team_id("Hawks");

        let result = update_team(&test_db.pool, hawks_id, &eagles()).await;
        assert!(matches!(result, Err(AppError::Uniqueness(_))));

        let hawks = get_team(&test_db.pool, hawks_id).await.expect("Hawks missing");
        assert_eq!(hawks.name, "Hawks");
        assert_eq!(hawks.coach, "Sam Rivera");
    }

    #[rocket::async_test]
    async fn test_missing_records_are_not_found() {
        let test_db = create_standard_test_db().await;

        assert!(matches!(
            get_team(&test_db.pool, 999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            update_team(&test_db.pool, 999, &eagles()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            delete_match(&test_db.pool, 999).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            update_venue(
                &test_db.pool,
                999,
                &VenueInput {
                    name: "Nowhere".to_string(),
                    location: "Nowhere".to_string(),
                    capacity: 1,
                }
            )
            .await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(test_db.count("teams").await, 2);
    }

    #[rocket::async_test]
    async fn test_invalid_input_never_reaches_the_store() {
        let test_db = TestDbBuilder::new()
            .build()
            .await
            .expect("Failed to build test database");

        let result = create_team(
            &test_db.pool,
            &TeamInput {
                name: "   ".to_string(),
                coach: "Coach".to_string(),
                founded_year: 1700,
            },
        )
        .await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("name"));
                assert!(msg.contains("founded_year"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert_eq!(test_db.count("teams").await, 0);
    }

    #[rocket::async_test]
    async fn test_duplicate_player_email_is_rejected() {
        let test_db = create_standard_test_db().await;

        let result = create_player(
            &test_db.pool,
            &PlayerInput {
                name: "Another Jamie".to_string(),
                email: "jamie@example.com".to_string(),
                team_id: test_db.team_id("Hawks"),
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Uniqueness(_))));
        assert_eq!(test_db.count("players").await, 2);
    }

    #[rocket::async_test]
    async fn test_player_for_missing_team_violates_integrity() {
        let test_db = create_standard_test_db().await;

        let result = create_player(
            &test_db.pool,
            &PlayerInput {
                name: "Ghost".to_string(),
                email: "ghost@example.com".to_string(),
                team_id: 999,
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Integrity(_))));
        assert_eq!(test_db.count("players").await, 2);
    }

    #[rocket::async_test]
    async fn test_player_transfer_and_team_filter() {
        let test_db = create_standard_test_db().await;
        let player_id = test_db.player_id("jamie@example.com");
        let hawks_id = test_db.team_id("Hawks");

        let moved = update_player(
            &test_db.pool,
            player_id,
            &PlayerInput {
                name: "Jamie Lee".to_string(),
                email: "jamie@example.com".to_string(),
                team_id: hawks_id,
            },
        )
        .await
        .expect("Failed to update player");
        assert_eq!(moved.team_name, "Hawks");

        let hawks_players = get_all_players(&test_db.pool, Some(hawks_id))
            .await
            .expect("Failed to list players");
        let names: Vec<&str> = hawks_players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Jamie Lee", "Robin Park"]);

        let eagles_players = get_all_players(&test_db.pool, Some(test_db.team_id("Eagles")))
            .await
            .expect("Failed to list players");
        assert!(eagles_players.is_empty());
    }

    #[rocket::async_test]
    async fn test_create_match_round_trips_schedule() {
        let test_db = create_standard_test_db().await;

        let created = create_match(
            &test_db.pool,
            &match_input(test_db.team_id("Hawks"), test_db.venue_id("North Field")),
        )
        .await
        .expect("Failed to create match");

        let fetched = get_match(&test_db.pool, created.id)
            .await
            .expect("Failed to fetch match");

        assert_eq!(fetched, created);
        assert_eq!(fetched.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(fetched.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
        assert_eq!(fetched.description.as_deref(), Some("Cup quarter-final"));
        assert_eq!(fetched.team_name, "Hawks");
        assert_eq!(fetched.venue_name, "North Field");
    }

    #[rocket::async_test]
    async fn test_match_counts_default_to_zero() {
        let test_db = create_standard_test_db().await;

        let input: MatchInput = serde_json::from_value(serde_json::json!({
            "team_id": test_db.team_id("Eagles"),
            "opponent": "Owls",
            "venue_id": test_db.venue_id("South Arena"),
            "date": "2024-05-01",
            "time": "10:00",
            "duration": 45,
            "description": null
        }))
        .expect("Failed to deserialize match input");

        let created = create_match(&test_db.pool, &input)
            .await
            .expect("Failed to create match");
        assert_eq!(created.invited_count, 0);
        assert_eq!(created.accepted_count, 0);
        assert!(created.description.is_none());
    }

    #[rocket::async_test]
    async fn test_accepted_cannot_exceed_invited() {
        let test_db = create_standard_test_db().await;
        let mut input = match_input(test_db.team_id("Eagles"), test_db.venue_id("North Field"));
        input.accepted_count = input.invited_count + 1;

        let result = create_match(&test_db.pool, &input).await;
        assert!(matches!(result, Err(AppError::Validation(ref msg)) if msg.contains("accepted_count")));
        assert_eq!(test_db.count("matches").await, 2);
    }

    #[rocket::async_test]
    async fn test_update_match_with_missing_venue_rolls_back() {
        let test_db = create_standard_test_db().await;
        let match_id = test_db.match_ids[0];
        let before = get_match(&test_db.pool, match_id).await.expect("missing");

        let result = update_match(
            &test_db.pool,
            match_id,
            &match_input(test_db.team_id("Eagles"), 999),
        )
        .await;
        assert!(matches!(result, Err(AppError::Integrity(_))));

        let after = get_match(&test_db.pool, match_id).await.expect("missing");
        assert_eq!(before, after);
    }

    #[rocket::async_test]
    async fn test_matches_listed_newest_first() {
        let test_db = create_standard_test_db().await;

        let matches = get_all_matches(&test_db.pool).await.expect("Failed to list");
        let opponents: Vec<&str> = matches.iter().map(|m| m.opponent.as_str()).collect();
        assert_eq!(opponents, vec!["Ravens", "Falcons"]);
    }

    #[rocket::async_test]
    async fn test_delete_team_cascades_to_players_and_matches() {
        let test_db = create_standard_test_db().await;

        delete_team(&test_db.pool, test_db.team_id("Eagles"))
            .await
            .expect("Failed to delete team");

        assert_eq!(test_db.count("teams").await, 1);
        assert_eq!(test_db.count("players").await, 1);
        assert_eq!(test_db.count("matches").await, 0);
        assert!(matches!(
            get_player(&test_db.pool, test_db.player_id("jamie@example.com")).await,
            Err(AppError::NotFound(_))
        ));
        // Hawks' player is untouched
        get_player(&test_db.pool, test_db.player_id("robin@example.com"))
            .await
            .expect("Unrelated player should survive");
    }

    #[rocket::async_test]
    async fn test_delete_venue_cascades_to_matches() {
        let test_db = create_standard_test_db().await;

        delete_venue(&test_db.pool, test_db.venue_id("North Field"))
            .await
            .expect("Failed to delete venue");

        let remaining = get_all_matches(&test_db.pool).await.expect("Failed to list");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].venue_name, "South Arena");
        assert_eq!(test_db.count("teams").await, 2);
    }

    #[rocket::async_test]
    async fn test_duplicate_venue_name_is_rejected() {
        let test_db = create_standard_test_db().await;

        let result = create_venue(
            &test_db.pool,
            &VenueInput {
                name: "North Field".to_string(),
                location: "Elsewhere".to_string(),
                capacity: 10,
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Uniqueness(ref msg)) if msg.contains("venues.name")));
        assert_eq!(test_db.count("venues").await, 2);
    }
}
