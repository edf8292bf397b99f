//! Deployment round tests.
//!
//! Tests cover: cost deduction, round success and its rewards, timeout
//! refunds, level-ups, timer cleanup and every rejection path.

use quantum_drift_core::{
    config::GameConfig,
    deployment_round::RoundState,
    error::GameError,
    game::{Game, Phase},
    quiz::QuestionBank,
    scheduler::TimerTask,
    service::Service,
};

fn build(session_id: &str, seed: u64) -> Game {
    let mut game = Game::build_test(session_id, seed).expect("build test game");
    game.start_game().unwrap();
    game
}

fn build_with_credits(session_id: &str, credits: u32) -> Game {
    let config = GameConfig { starting_credits: credits, ..GameConfig::default() };
    let mut game = Game::build_test_with(session_id, 42, config, QuestionBank::fallback())
        .expect("build test game");
    game.start_game().unwrap();
    game
}

/// Click correct targets as they appear until the round ends.
fn play_round(game: &mut Game) {
    while game.round().is_active() {
        match game.round().correct_target() {
            Some(id) => {
                game.click_target(id).unwrap();
            }
            None => game.advance(2000).unwrap(),
        }
    }
}

#[test]
fn deploy_deducts_cost_and_enters_hacking() {
    let mut game = build("deploy-start", 42);
    game.deploy_service("s3").unwrap();

    assert_eq!(game.player().credits, 450);
    assert_eq!(game.phase(), Phase::Hacking);
    assert!(game.round().is_active());
    assert_eq!(game.round().required(), 9);
    assert!(game.transcript().contains("Initiating deployment of S3..."));
    assert!(!game.round().targets().is_empty(), "targets spawn immediately");
}

#[test]
fn successful_round_rewards_player() {
    let mut game = build("deploy-success", 42);
    game.deploy_service("S3").unwrap();
    play_round(&mut game);

    assert_eq!(game.round().state(), RoundState::Succeeded);
    assert!(game.player().has_deployed(Service::S3));
    assert_eq!(game.player().xp, 25);
    assert_eq!(game.phase(), Phase::World);
    assert!(game.transcript().contains("S3 deployed successfully! +25 XP"));
    assert_eq!(game.store().event_count(&game.session_id, "deployment_succeeded").unwrap(), 1);
}

#[test]
fn ended_round_leaves_no_timers() {
    let mut game = build("deploy-timers", 42);
    game.deploy_service("lambda").unwrap();
    assert_eq!(game.scheduler().pending_of(TimerTask::RoundCountdown), 1);
    assert_eq!(game.scheduler().pending_of(TimerTask::RoundSpawn), 1);

    play_round(&mut game);
    assert_eq!(game.scheduler().pending_of(TimerTask::RoundCountdown), 0);
    assert_eq!(game.scheduler().pending_of(TimerTask::RoundSpawn), 0);
    assert!(game.round().targets().is_empty());
}

#[test]
fn timeout_refunds_half_the_cost() {
    let mut game = build("deploy-timeout", 42);
    game.deploy_service("ec2").unwrap();
    assert_eq!(game.player().credits, 400);

    game.advance(45_000).unwrap();

    assert_eq!(game.round().state(), RoundState::TimedOut);
    assert_eq!(game.player().credits, 450);
    assert!(!game.player().has_deployed(Service::Ec2));
    assert_eq!(game.phase(), Phase::World);
    assert!(game.transcript().contains("Deployment failed. 50 credits refunded."));
    assert_eq!(game.scheduler().pending_count(), 0);
}

#[test]
fn refund_uses_catalog_cost_for_api_gateway() {
    let mut game = build("deploy-apigw-refund", 42);
    game.deploy_service("apigateway").unwrap();
    assert_eq!(game.player().credits, 380);
    game.advance(45_000).unwrap();
    assert_eq!(game.player().credits, 440);
}

#[test]
fn clicks_after_round_end_change_nothing() {
    let mut game = build("deploy-inert", 42);
    game.deploy_service("sns").unwrap();
    let stale = game.round().targets()[0].id;
    game.advance(45_000).unwrap();

    let credits = game.player().credits;
    let lines = game.transcript().len();
    game.click_target(stale).unwrap();
    game.advance(10_000).unwrap();

    assert_eq!(game.player().credits, credits);
    assert_eq!(game.transcript().len(), lines);
    assert_eq!(game.store().event_count(&game.session_id, "deployment_failed").unwrap(), 1);
}

#[test]
fn fourth_deployment_levels_up() {
    let mut game = build_with_credits("deploy-level", 1000);
    for service in ["s3", "sns", "sqs", "ec2"] {
        game.deploy_service(service).unwrap();
        play_round(&mut game);
    }

    assert_eq!(game.player().deployed.len(), 4);
    assert_eq!(game.player().level, 2);
    assert_eq!(game.player().xp, 0);
    assert_eq!(game.player().max_health, 110);
    assert!(game.transcript().contains("LEVEL UP! You are now level 2"));
}

#[test]
fn difficulty_lowers_required_hits() {
    let mut game = build_with_credits("deploy-difficulty", 1000);
    game.deploy_service("s3").unwrap();
    assert_eq!(game.round().required(), 9);
    play_round(&mut game);
    game.deploy_service("sns").unwrap();
    assert_eq!(game.round().required(), 9, "difficulty 1.5 still needs 9");
    play_round(&mut game);
    game.deploy_service("sqs").unwrap();
    assert_eq!(game.round().required(), 8);
}

#[test]
fn second_deployment_while_busy_is_rejected() {
    let mut game = build("deploy-busy", 42);
    game.deploy_service("s3").unwrap();
    let err = game.deploy_service("ec2").unwrap_err();

    assert!(matches!(err, GameError::Busy { .. }));
    assert_eq!(game.player().credits, 450);
    assert_eq!(game.round().service(), Some(Service::S3));
}

#[test]
fn unknown_service_is_rejected() {
    let mut game = build("deploy-unknown", 42);
    let err = game.deploy_service("quantum").unwrap_err();

    assert!(matches!(err, GameError::UnknownService { .. }));
    assert_eq!(game.player().credits, 500);
    assert_eq!(game.phase(), Phase::World);
    assert_eq!(game.transcript().last(), Some("Unknown service: quantum"));
}

#[test]
fn redeploying_is_rejected() {
    let mut game = build("deploy-twice", 42);
    game.deploy_service("s3").unwrap();
    play_round(&mut game);

    let err = game.deploy_service("s3").unwrap_err();
    assert!(matches!(err, GameError::AlreadyDeployed { .. }));
    assert_eq!(game.player().credits, 450);
}

#[test]
fn insufficient_credits_leave_state_untouched() {
    let mut game = build_with_credits("deploy-broke", 40);
    let err = game.deploy_service("ec2").unwrap_err();

    assert!(matches!(err, GameError::InsufficientFunds { needed: 100, available: 40 }));
    assert_eq!(game.player().credits, 40);
    assert_eq!(game.phase(), Phase::World);
    assert!(!game.round().is_active());
}
