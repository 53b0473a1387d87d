use crate::utils::{CONTRACT, Call, MockWallet};
use alloy_primitives::{TxHash, U256};
use fund_me::{
    ActionStatus, CONNECTED_LABEL, FundMeContract, FundMeController, INSTALL_WALLET_LABEL,
    MemoryPage, TransactionWatcher,
};
use std::{sync::Arc, time::Duration};

type Controller = FundMeController<MockWallet, Arc<MemoryPage>>;

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(10).pow(U256::from(18))
}

fn controller(wallet: Option<Arc<MockWallet>>, timeout: Option<Duration>) -> Controller {
    let contract = FundMeContract::with_default_interface(CONTRACT).unwrap();
    let watcher = TransactionWatcher::new(timeout);
    FundMeController::new(wallet, Arc::new(MemoryPage::new()), contract, watcher)
}

fn with_wallet(wallet: MockWallet) -> (Arc<MockWallet>, Controller) {
    let wallet = Arc::new(wallet);
    (wallet.clone(), controller(Some(wallet), None))
}

#[tokio::test]
async fn no_wallet_only_connect_prompts() {
    let controller = controller(None, None);

    assert_eq!(controller.get_balance().await, ActionStatus::NoWallet);
    assert!(controller.page().lines().is_empty());

    controller.page().set_amount("1");
    assert_eq!(controller.fund().await, ActionStatus::NoWallet);
    assert_eq!(controller.withdraw().await, ActionStatus::NoWallet);
    assert!(controller.page().lines().is_empty());
    assert_eq!(controller.page().label(), "");

    assert_eq!(controller.connect().await, ActionStatus::NoWallet);
    assert_eq!(controller.page().label(), INSTALL_WALLET_LABEL);
}

#[tokio::test]
async fn connect_sets_label() {
    let (wallet, controller) = with_wallet(MockWallet::mining(1));

    assert_eq!(controller.connect().await, ActionStatus::Completed);
    assert_eq!(controller.page().label(), CONNECTED_LABEL);
    assert_eq!(wallet.calls(), [Call::RequestAccounts]);
}

#[tokio::test]
async fn connect_rejection_is_reported() {
    let (_, controller) = with_wallet(MockWallet::mining(1).rejecting_accounts());

    let status = controller.connect().await;

    let ActionStatus::Failed(message) = status else { panic!("expected failure, got {status:?}") };
    assert!(message.contains("rejected"), "{message}");
    assert_eq!(controller.page().lines(), [message]);
    assert_eq!(controller.page().label(), "");
}

#[tokio::test]
async fn get_balance_logs_ether() {
    let balance = ether(3) / U256::from(2);
    let (wallet, controller) = with_wallet(MockWallet::mining(1).with_balance(balance));

    assert_eq!(controller.get_balance().await, ActionStatus::Balance(balance));
    assert_eq!(controller.page().lines(), ["1.5"]);
    assert_eq!(wallet.calls(), [Call::GetBalance(CONTRACT)]);
}

#[tokio::test]
async fn fund_reports_progress() {
    let (wallet, controller) = with_wallet(MockWallet::mining(1));
    controller.page().set_amount("0.5");

    assert_eq!(controller.fund().await, ActionStatus::Completed);

    let hash = TxHash::with_last_byte(1);
    assert_eq!(
        controller.page().lines(),
        [
            "Funding with 0.5...".to_string(),
            format!("Mining {hash:#x}..."),
            "Completed with 1 confirmations".to_string(),
            "Done!".to_string(),
        ]
    );
    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].value, Some(ether(1) / U256::from(2)));
    assert_eq!(wallet.calls().last(), Some(&Call::WatchMined(hash)));
}

#[tokio::test]
async fn get_balance_error_is_logged() {
    let (_, controller) = with_wallet(MockWallet::mining(1).failing_balance("header not found"));

    let status = controller.get_balance().await;

    let ActionStatus::Failed(message) = status else { panic!("expected failure, got {status:?}") };
    assert!(message.contains("header not found"), "{message}");
    assert_eq!(controller.page().lines(), [message]);
}

#[tokio::test]
async fn fund_converts_to_wei() {
    let (wallet, controller) = with_wallet(MockWallet::mining(1));
    controller.page().set_amount("1");

    assert_eq!(controller.fund().await, ActionStatus::Completed);
    assert_eq!(wallet.sent()[0].value, Some(U256::from(10).pow(U256::from(18))));
}

#[tokio::test]
async fn fund_logs_amount_as_typed() {
    let (wallet, controller) = with_wallet(MockWallet::mining(1));
    controller.page().set_amount(" 0.5 ");

    assert_eq!(controller.fund().await, ActionStatus::Completed);
    assert_eq!(controller.page().lines()[0], "Funding with  0.5 ...");
    assert_eq!(wallet.sent()[0].value, Some(ether(1) / U256::from(2)));
}

#[tokio::test]
async fn fund_submission_error_is_logged() {
    let wallet = MockWallet::mining(1).failing_sends("insufficient funds for gas * price + value");
    let (_, controller) = with_wallet(wallet);
    controller.page().set_amount("0.5");

    let status = controller.fund().await;

    assert!(matches!(status, ActionStatus::Failed(_)), "{status:?}");
    let lines = controller.page().lines();
    assert_eq!(lines[0], "Funding with 0.5...");
    assert!(lines.iter().any(|line| line.contains("insufficient funds")), "{lines:?}");
    assert!(!lines.iter().any(|line| line == "Done!"));
}

#[tokio::test]
async fn fund_rejects_bad_amounts_before_submitting() {
    for amount in ["", "abc", "-1"] {
        let (wallet, controller) = with_wallet(MockWallet::mining(1));
        controller.page().set_amount(amount);

        assert!(matches!(controller.fund().await, ActionStatus::Failed(_)), "{amount:?}");
        assert!(wallet.calls().is_empty());
        assert_eq!(controller.page().lines().len(), 2);
    }
}

#[tokio::test]
async fn withdraw_reports_progress() {
    let (wallet, controller) = with_wallet(MockWallet::mining(2));

    assert_eq!(controller.withdraw().await, ActionStatus::Completed);

    let hash = TxHash::with_last_byte(1);
    assert_eq!(
        controller.page().lines(),
        [
            "Withdrawing...".to_string(),
            format!("Mining {hash:#x}..."),
            "Completed with 2 confirmations".to_string(),
        ]
    );
    assert_eq!(wallet.sent()[0].value, None);
}

#[tokio::test]
async fn withdraw_submission_error_is_logged() {
    let wallet = MockWallet::mining(1).failing_sends("execution reverted");
    let (wallet, controller) = with_wallet(wallet);

    let status = controller.withdraw().await;

    assert!(matches!(status, ActionStatus::Failed(_)), "{status:?}");
    let lines = controller.page().lines();
    assert_eq!(lines[0], "Withdrawing...");
    assert!(lines[1].contains("execution reverted"), "{lines:?}");
    assert_eq!(lines.len(), 2);
    assert!(!wallet.calls().iter().any(|call| matches!(call, Call::WatchMined(_))));
}

#[tokio::test]
async fn queued_fund_keeps_its_own_amount() {
    let wallet = Arc::new(MockWallet::manual());
    let controller = Arc::new(controller(Some(wallet.clone()), None));
    controller.page().set_amount("5");

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fund_amount("1").await }
    });
    // A second click arriving before the first one got to run.
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fund_amount("2").await }
    });
    while wallet.watching() == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(second.await.unwrap(), ActionStatus::Busy);
    wallet.mine_pending(1);
    assert_eq!(first.await.unwrap(), ActionStatus::Completed);

    let sent = wallet.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].value, Some(ether(1)));
    assert_eq!(controller.page().lines()[0], "Funding with 1...");
}

#[tokio::test]
async fn same_action_runs_once_at_a_time() {
    let wallet = Arc::new(MockWallet::manual());
    let controller = Arc::new(controller(Some(wallet.clone()), None));
    controller.page().set_amount("0.1");

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fund().await }
    });
    while wallet.watching() == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(controller.fund().await, ActionStatus::Busy);
    // Other actions are not blocked.
    assert_eq!(controller.connect().await, ActionStatus::Completed);

    wallet.mine_pending(1);
    assert_eq!(first.await.unwrap(), ActionStatus::Completed);

    // The guard is released once the first fund completes.
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fund().await }
    });
    while wallet.watching() == 0 {
        tokio::task::yield_now().await;
    }
    wallet.mine_pending(1);
    assert_eq!(second.await.unwrap(), ActionStatus::Completed);
    assert_eq!(wallet.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn unmined_fund_times_out() {
    let wallet = Arc::new(MockWallet::manual());
    let controller = controller(Some(wallet.clone()), Some(Duration::from_secs(60)));
    controller.page().set_amount("0.1");

    assert_eq!(controller.fund().await, ActionStatus::TimedOut);

    let lines = controller.page().lines();
    let hash = TxHash::with_last_byte(1);
    assert_eq!(lines.last().unwrap(), &format!("Timed out waiting for {hash:#x}"));
    assert!(!lines.iter().any(|line| line == "Done!"));
}
