//! Player/admin actions, views and LocalProgram rule tests

#[cfg(test)]
mod tests {
    use oracle_quest::{
        actions::{self, DUPLICATE_BET, INVALID_AMOUNT, PROFILE_EXISTS, PROFILE_MISSING, UNAUTHORIZED, WALLET_NOT_CONNECTED},
        address,
        error::ProgramError,
        ledger::MAX_DESCRIPTION_LEN,
        types::{sol_to_lamports, Address, Wallet},
        views::{self, EventFilter, ProfileStatus},
        LocalProgram, Lookup, ProgramClient,
    };
    use tokio_test::block_on;

    const PROGRAM: Address = Address([0x11; 32]);
    const ADMIN: Address = Address([0xAA; 32]);
    const ALICE: Address = Address([0x01; 32]);
    const BOB: Address = Address([0x02; 32]);

    fn admin() -> Wallet {
        Wallet::new(ADMIN)
    }

    fn alice() -> Wallet {
        Wallet::new(ALICE)
    }

    fn bob() -> Wallet {
        Wallet::new(BOB)
    }

    /// A ledger with events 1..=3 and Alice's profile.
    fn setup() -> LocalProgram {
        let program = LocalProgram::new(PROGRAM, ADMIN);
        block_on(async {
            for id in 1..=3 {
                let r = actions::create_event(&program, Some(&admin()), &ADMIN, id, &format!("Event {}", id)).await;
                assert!(r.success, "{}", r.message);
            }
            assert!(actions::initialize_player(&program, Some(&alice())).await.success);
        });
        program
    }

    // -----------------------------------------------------------------------
    // Wallet gate
    // -----------------------------------------------------------------------

    #[test]
    fn every_action_requires_a_wallet() {
        let program = setup();
        block_on(async {
            let r = actions::initialize_player(&program, None).await;
            assert_eq!(r, actions::ActionOutcome::fail(WALLET_NOT_CONNECTED));

            let r = actions::place_bet(&program, None, 1, true, 0.1).await;
            assert_eq!(r.message, WALLET_NOT_CONNECTED);

            let r = actions::claim_winnings(&program, None, 1).await;
            assert_eq!(r.message, WALLET_NOT_CONNECTED);

            let r = actions::create_event(&program, None, &ADMIN, 9, "x").await;
            assert_eq!(r.message, WALLET_NOT_CONNECTED);
        });
        assert_eq!(program.stats().submissions, 4);
    }

    // -----------------------------------------------------------------------
    // Profile
    // -----------------------------------------------------------------------

    #[test]
    fn existing_profile_is_a_soft_success() {
        let program = setup();
        let r = block_on(actions::initialize_player(&program, Some(&alice())));
        assert!(r.success);
        assert_eq!(r.message, PROFILE_EXISTS);
    }

    #[test]
    fn program_rejects_duplicate_profile() {
        let program = setup();
        let err = block_on(program.initialize_player(&ALICE)).unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn profile_status_reflects_wallet_and_profile() {
        let program = setup();
        block_on(async {
            assert_eq!(views::profile_status(&program, None).await.unwrap(), ProfileStatus::NoWallet);
            assert_eq!(
                views::profile_status(&program, Some(&bob())).await.unwrap(),
                ProfileStatus::NotInitialized
            );
            match views::profile_status(&program, Some(&alice())).await.unwrap() {
                ProfileStatus::Initialized(p) => assert_eq!(p.owner, ALICE),
                other => panic!("expected profile, got {:?}", other),
            }
        });
    }

    // -----------------------------------------------------------------------
    // Betting
    // -----------------------------------------------------------------------

    #[test]
    fn bet_updates_event_and_profile() {
        let program = setup();
        block_on(async {
            let r = actions::place_bet(&program, Some(&alice()), 2, false, 0.5).await;
            assert!(r.success, "{}", r.message);

            let lookup = Lookup::new(&program);
            let event = lookup.event(2).await.unwrap().unwrap();
            assert_eq!(event.total_bets, 1);
            assert_eq!(event.no_votes, 1);
            assert_eq!(event.total_amount, sol_to_lamports(0.5));

            let profile = lookup.profile(&ALICE).await.unwrap().unwrap();
            assert_eq!(profile.total_bets, 1);

            let bet = lookup.bet(&ALICE, 2).await.unwrap().unwrap();
            assert_eq!(bet.address, address::bet_address(&PROGRAM, &ALICE, 2));
            assert!(!bet.chosen_outcome);
        });
    }

    #[test]
    fn duplicate_bet_is_reported_without_submitting() {
        let program = setup();
        block_on(async {
            assert!(actions::place_bet(&program, Some(&alice()), 1, true, 0.1).await.success);
            let submitted = program.stats().submissions;

            let r = actions::place_bet(&program, Some(&alice()), 1, false, 0.2).await;
            assert!(!r.success);
            assert_eq!(r.message, DUPLICATE_BET);
            assert_eq!(program.stats().submissions, submitted);
        });
    }

    #[test]
    fn duplicate_bet_from_program_maps_to_friendly_message() {
        let program = setup();
        block_on(async {
            program.place_bet(&ALICE, 1, true, 1_000).await.unwrap();
            let err = program.place_bet(&ALICE, 1, true, 1_000).await.unwrap_err();
            assert!(err.is_duplicate());
            assert!(err.to_string().contains("already in use"));
        });
    }

    #[test]
    fn bet_without_profile_is_rejected_before_submit() {
        let program = setup();
        let before = program.stats().submissions;
        let r = block_on(actions::place_bet(&program, Some(&bob()), 1, true, 0.1));
        assert_eq!(r.message, PROFILE_MISSING);
        assert_eq!(program.stats().submissions, before);
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        let program = setup();
        block_on(async {
            for amount in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-12] {
                let r = actions::place_bet(&program, Some(&alice()), 1, true, amount).await;
                assert_eq!(r.message, INVALID_AMOUNT, "amount {}", amount);
            }
        });
    }

    #[test]
    fn bet_on_resolved_event_is_rejected() {
        let program = setup();
        block_on(async {
            assert!(actions::resolve_event(&program, Some(&admin()), &ADMIN, 3, true).await.success);
            let r = actions::place_bet(&program, Some(&alice()), 3, true, 0.1).await;
            assert!(!r.success);
            assert_eq!(r.message, ProgramError::AlreadyResolved.to_string());
        });
    }

    #[test]
    fn offline_program_rejection_is_shown_verbatim() {
        let program = setup();
        program.set_offline(Some("Transaction simulation failed"));
        let r = block_on(actions::place_bet(&program, Some(&alice()), 1, true, 0.1));
        assert!(!r.success);
        assert!(r.message.contains("Transaction simulation failed"));
    }

    // -----------------------------------------------------------------------
    // Claiming
    // -----------------------------------------------------------------------

    #[test]
    fn winning_claim_pays_double_once() {
        let program = setup();
        block_on(async {
            actions::place_bet(&program, Some(&alice()), 1, true, 1.0).await;
            let r = actions::claim_winnings(&program, Some(&alice()), 1).await;
            assert!(!r.success, "claim before resolution must fail");

            actions::resolve_event(&program, Some(&admin()), &ADMIN, 1, true).await;
            let r = actions::claim_winnings(&program, Some(&alice()), 1).await;
            assert!(r.success, "{}", r.message);
            assert_eq!(r.message, "Claimed 2 SOL");

            let profile = Lookup::new(&program).profile(&ALICE).await.unwrap().unwrap();
            assert_eq!(profile.bets_won, 1);
            assert_eq!(profile.balance, sol_to_lamports(2.0));

            let r = actions::claim_winnings(&program, Some(&alice()), 1).await;
            assert_eq!(r.message, ProgramError::AlreadyClaimed.to_string());
        });
    }

    #[test]
    fn losing_claim_is_rejected() {
        let program = setup();
        block_on(async {
            actions::place_bet(&program, Some(&alice()), 1, false, 1.0).await;
            actions::resolve_event(&program, Some(&admin()), &ADMIN, 1, true).await;
            let r = actions::claim_winnings(&program, Some(&alice()), 1).await;
            assert_eq!(r.message, ProgramError::BetLost.to_string());
        });
    }

    #[test]
    fn pool_overflow_is_rejected_without_changing_the_ledger() {
        let program = setup();
        block_on(async {
            assert!(actions::initialize_player(&program, Some(&bob())).await.success);
            let r = actions::place_bet(&program, Some(&alice()), 1, true, 1.0e10).await;
            assert!(r.success, "{}", r.message);

            let r = actions::place_bet(&program, Some(&bob()), 1, true, 1.0e10).await;
            assert!(!r.success);
            assert_eq!(r.message, ProgramError::ArithmeticOverflow.to_string());

            let lookup = Lookup::new(&program);
            let event = lookup.event(1).await.unwrap().unwrap();
            assert_eq!(event.total_bets, 1);
            assert_eq!(event.total_amount, sol_to_lamports(1.0e10));
            assert_eq!(lookup.bet(&BOB, 1).await.unwrap(), None);
        });
    }

    #[test]
    fn payout_overflow_is_rejected_and_bet_stays_unclaimed() {
        let program = setup();
        block_on(async {
            actions::place_bet(&program, Some(&alice()), 1, true, 1.0e10).await;
            actions::resolve_event(&program, Some(&admin()), &ADMIN, 1, true).await;

            let r = actions::claim_winnings(&program, Some(&alice()), 1).await;
            assert!(!r.success);
            assert_eq!(r.message, ProgramError::ArithmeticOverflow.to_string());

            let lookup = Lookup::new(&program);
            assert!(!lookup.bet(&ALICE, 1).await.unwrap().unwrap().claimed);
            let profile = lookup.profile(&ALICE).await.unwrap().unwrap();
            assert_eq!(profile.balance, 0);
            assert_eq!(profile.bets_won, 0);
        });
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    #[test]
    fn admin_actions_are_gated() {
        let program = setup();
        let before = program.stats().submissions;
        block_on(async {
            let r = actions::create_event(&program, Some(&alice()), &ADMIN, 10, "nope").await;
            assert_eq!(r.message, UNAUTHORIZED);
            let r = actions::resolve_event(&program, Some(&alice()), &ADMIN, 1, true).await;
            assert_eq!(r.message, UNAUTHORIZED);
            let bet = address::bet_address(&PROGRAM, &ALICE, 1);
            let r = actions::close_bet(&program, Some(&alice()), &ADMIN, &bet).await;
            assert_eq!(r.message, UNAUTHORIZED);
        });
        assert_eq!(program.stats().submissions, before);
        assert!(!actions::is_admin(None, &ADMIN));
        assert!(actions::is_admin(Some(&admin()), &ADMIN));
    }

    #[test]
    fn only_admin_may_create_or_resolve() {
        let program = setup();
        block_on(async {
            let err = program.create_event(&BOB, 20, "Bob's own event").await.unwrap_err();
            assert_eq!(err, ProgramError::Unauthorized);
            assert_eq!(Lookup::new(&program).event(20).await.unwrap(), None);

            program.create_event(&ADMIN, 20, "Admin event").await.unwrap();
            let err = program.resolve_event(&BOB, 20, true).await.unwrap_err();
            assert_eq!(err, ProgramError::Unauthorized);
            program.resolve_event(&ADMIN, 20, false).await.unwrap();
            let err = program.resolve_event(&ADMIN, 20, true).await.unwrap_err();
            assert_eq!(err, ProgramError::AlreadyResolved);
        });
    }

    #[test]
    fn duplicate_event_and_long_description() {
        let program = setup();
        block_on(async {
            let r = actions::create_event(&program, Some(&admin()), &ADMIN, 1, "again").await;
            assert_eq!(r.message, "Event #1 already exists");

            let long = "x".repeat(MAX_DESCRIPTION_LEN + 1);
            let r = actions::create_event(&program, Some(&admin()), &ADMIN, 50, &long).await;
            assert_eq!(r.message, ProgramError::DescriptionTooLong.to_string());

            let exact = "x".repeat(MAX_DESCRIPTION_LEN);
            assert!(actions::create_event(&program, Some(&admin()), &ADMIN, 51, &exact).await.success);
        });
    }

    #[test]
    fn description_limit_counts_bytes() {
        let program = setup();
        // 101 characters, 202 bytes.
        let accented = "é".repeat(MAX_DESCRIPTION_LEN / 2 + 1);
        assert!(accented.chars().count() < MAX_DESCRIPTION_LEN);
        let err = block_on(program.create_event(&ADMIN, 60, &accented)).unwrap_err();
        assert_eq!(err, ProgramError::DescriptionTooLong);
    }

    #[test]
    fn admin_closes_bet() {
        let program = setup();
        block_on(async {
            actions::place_bet(&program, Some(&alice()), 1, true, 0.1).await;
            let bet = address::bet_address(&PROGRAM, &ALICE, 1);
            assert!(actions::close_bet(&program, Some(&admin()), &ADMIN, &bet).await.success);
            assert_eq!(Lookup::new(&program).bet(&ALICE, 1).await.unwrap(), None);
        });
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    #[test]
    fn event_filters() {
        let program = setup();
        block_on(async {
            actions::resolve_event(&program, Some(&admin()), &ADMIN, 2, false).await;

            let all = views::browse_events(&program, EventFilter::All).await.unwrap();
            assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2, 3]);

            let active = views::browse_events(&program, EventFilter::Active).await.unwrap();
            assert_eq!(active.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 3]);

            let resolved = views::browse_events(&program, EventFilter::Resolved).await.unwrap();
            assert_eq!(resolved.len(), 1);
            assert_eq!(resolved[0].outcome, Some(false));
        });
        assert_eq!("Active".parse::<EventFilter>(), Ok(EventFilter::Active));
        assert!("soon".parse::<EventFilter>().is_err());
    }

    #[test]
    fn event_card_percentages() {
        let program = setup();
        block_on(async {
            let cards = views::browse_events(&program, EventFilter::All).await.unwrap();
            assert_eq!(cards[0].yes_percentage, 50.0);

            actions::initialize_player(&program, Some(&bob())).await;
            actions::place_bet(&program, Some(&alice()), 1, true, 1.0).await;
            actions::place_bet(&program, Some(&bob()), 1, true, 1.0).await;

            let cards = views::browse_events(&program, EventFilter::All).await.unwrap();
            assert_eq!(cards[0].yes_percentage, 100.0);
            assert_eq!(cards[0].no_percentage, 0.0);
            assert_eq!(cards[0].pool_sol, 2.0);
        });
    }

    #[test]
    fn quest_log_reports_won_lost_and_pending() {
        let program = setup();
        block_on(async {
            actions::place_bet(&program, Some(&alice()), 1, true, 0.1).await;
            actions::place_bet(&program, Some(&alice()), 2, true, 0.1).await;
            actions::place_bet(&program, Some(&alice()), 3, true, 0.1).await;
            actions::resolve_event(&program, Some(&admin()), &ADMIN, 1, true).await;
            actions::resolve_event(&program, Some(&admin()), &ADMIN, 2, false).await;

            let log = views::quest_log(&program, &alice()).await.unwrap();
            let summary: Vec<(u64, Option<bool>)> = log.iter().map(|q| (q.event_id, q.won)).collect();
            assert_eq!(summary, vec![(3, None), (2, Some(false)), (1, Some(true))]);

            assert!(views::quest_log(&program, &bob()).await.unwrap().is_empty());
        });
    }

    #[test]
    fn admin_overview_requires_admin_wallet() {
        let program = setup();
        block_on(async {
            actions::place_bet(&program, Some(&alice()), 1, true, 0.1).await;

            assert_eq!(views::admin_overview(&program, Some(&alice()), &ADMIN).await.unwrap(), None);

            let overview = views::admin_overview(&program, Some(&admin()), &ADMIN)
                .await
                .unwrap()
                .expect("admin sees overview");
            assert_eq!(overview.events.len(), 3);
            assert_eq!(overview.bets.len(), 1);
        });
    }

    // -----------------------------------------------------------------------
    // Addresses
    // -----------------------------------------------------------------------

    #[test]
    fn address_hex_text() {
        let addr = Address([0xAB; 32]);
        let text = addr.to_hex();
        assert_eq!(text, "ab".repeat(32));
        assert_eq!(addr.short(), "abababab");
        assert_eq!(Address::from_hex(&text.to_uppercase()), Some(addr));
        assert_eq!(Address::from_hex(&format!("  {}\n", text)), Some(addr));

        assert_eq!(Address::from_hex(&text[..62]), None);
        assert_eq!(Address::from_hex(&format!("{}zz", &text[..62])), None);
        assert!("0xab".parse::<Address>().is_err());
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn ledger_survives_save_and_load() {
        let program = setup();
        block_on(actions::place_bet(&program, Some(&alice()), 1, true, 0.1));

        let path = std::env::temp_dir().join(format!("oracle-quest-ledger-{}.json", std::process::id()));
        program.save(&path).unwrap();
        let reloaded = LocalProgram::load(PROGRAM, ADMIN, &path).unwrap();
        std::fs::remove_file(&path).ok();

        block_on(async {
            assert_eq!(reloaded.fetch_events().await.unwrap().len(), 3);
            assert!(Lookup::new(&reloaded).bet(&ALICE, 1).await.unwrap().is_some());
        });
    }

    #[test]
    fn missing_ledger_file_loads_empty() {
        let path = std::env::temp_dir().join("oracle-quest-does-not-exist.json");
        let program = LocalProgram::load(PROGRAM, ADMIN, &path).unwrap();
        assert!(block_on(program.fetch_events()).unwrap().is_empty());
    }
}
