#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Page state: forms, ticket board, reports, history and user directory.

mod common;

use std::sync::Arc;

use common::{FakeHelpdeskClient, Harness, identity, interaction, ticket};
use helpdesk_client::views::{
    LoginForm, RegisterForm, ReportView, TicketBoard, TicketFilter, TicketHistoryView,
    UserDirectory,
};
use helpdesk_client::{HistoryNavigator, LoginOutcome, Navigator, Route, SessionState};
use helpdesk_sdk::{
    HelpdeskError, IdentityPatch, InteractionAuthor, NewTicket, Role, TicketPriority, TicketRef,
    TicketStatus, TicketUpdate,
};
use time::macros::datetime;

fn new_ticket(client_email: &str, subject: &str) -> NewTicket {
    NewTicket {
        client_email: client_email.to_owned(),
        subject: subject.to_owned(),
        description: "no imprime".to_owned(),
        priority: TicketPriority::Medium,
    }
}

#[tokio::test]
async fn test_login_form_shows_service_reason_verbatim() {
    let client = FakeHelpdeskClient::new();
    *client.login.lock() = Some(Err(HelpdeskError::Authentication {
        reason: Some("Credenciales inv\u{e1}lidas".to_owned()),
    }));
    let h = Harness::with_client(client, None);
    h.session.init().await;

    let mut form = LoginForm::new("bad@x.com");
    assert_eq!(form.submit(&h.session).await, None);
    assert_eq!(form.error(), Some("Credenciales inv\u{e1}lidas"));
    assert_eq!(h.session.current_identity(), None);
    assert_eq!(h.store.peek(), None);
}

#[tokio::test]
async fn test_login_form_requires_email() {
    let h = Harness::new(None);
    h.session.init().await;

    let mut form = LoginForm::default();
    assert_eq!(form.submit(&h.session).await, None);
    assert_eq!(form.error(), Some("El email es obligatorio"));
    assert!(h.client.call_log().is_empty());
}

#[tokio::test]
async fn test_login_form_success_clears_error() {
    let client = FakeHelpdeskClient::new();
    *client.login.lock() = Some(Ok(identity(1, Role::Customer, "c@x.com")));
    let h = Harness::with_client(client, None);
    h.session.init().await;

    let mut form = LoginForm::new("");
    form.submit(&h.session).await;
    form.email = "c@x.com".to_owned();
    let outcome = form.submit(&h.session).await;

    assert!(matches!(outcome, Some(LoginOutcome::LoggedIn(_))));
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn test_register_form() {
    let client = FakeHelpdeskClient::new();
    *client.register.lock() = Some(Ok(identity(9, Role::Customer, "new@x.com")));
    let navigator = HistoryNavigator::new(Route::Register);

    let mut form = RegisterForm::default();
    assert_eq!(form.role, Role::Customer);
    form.email = "new@x.com".to_owned();
    assert!(form.submit(&client, &navigator).await.is_err());
    assert_eq!(form.error(), Some("Nombre y email son obligatorios"));
    assert_eq!(client.calls("register"), 0);

    form.name = "Nuevo".to_owned();
    let created = form.submit(&client, &navigator).await.unwrap();
    assert_eq!(created.id, 9);
    assert!(form.notice().is_some());
    assert_eq!(navigator.current(), Route::Login);
}

#[tokio::test]
async fn test_board_fetches_once_per_identity_and_role() {
    let client = Arc::new(FakeHelpdeskClient::new());
    *client.tickets.lock() = Some(Ok(vec![ticket("1", TicketStatus::Open, TicketPriority::Low)]));
    let mut board = TicketBoard::new(client.clone());

    assert!(!board.sync(&SessionState::Resolving).await);
    assert_eq!(client.calls("list_tickets"), 0);

    let ana = SessionState::Resolved(Some(identity(1, Role::Customer, "a@x.com")));
    assert!(board.sync(&ana).await);
    assert!(!board.sync(&ana).await);
    assert_eq!(client.call_log(), vec!["list_tickets 1 cliente"]);
    assert_eq!(board.tickets().len(), 1);

    let promoted = SessionState::Resolved(Some(identity(1, Role::Operator, "a@x.com")));
    assert!(board.sync(&promoted).await);
    assert_eq!(client.calls("list_tickets"), 2);

    assert!(board.sync(&SessionState::Resolved(None)).await);
    assert!(board.tickets().is_empty());
    assert_eq!(client.calls("list_tickets"), 2);
}

#[tokio::test]
async fn test_board_read_failure_degrades_to_empty_state() {
    let client = Arc::new(FakeHelpdeskClient::new());
    *client.tickets.lock() = Some(Err(HelpdeskError::malformed("ticket", "missing field")));
    let mut board = TicketBoard::new(client.clone());

    board
        .sync(&SessionState::Resolved(Some(identity(1, Role::Customer, "a@x.com"))))
        .await;

    assert!(board.tickets().is_empty());
    assert_eq!(board.empty_state(), Some("No hay tickets disponibles."));
    assert_eq!(board.error(), None);
}

#[tokio::test]
async fn test_board_follows_session() {
    let client = FakeHelpdeskClient::new();
    *client.who_am_i.lock() = Some(Ok(identity(1, Role::Customer, "a@x.com")));
    *client.tickets.lock() = Some(Ok(vec![ticket("1", TicketStatus::Open, TicketPriority::Low)]));
    let h = Harness::with_client(client, Some("a@x.com"));

    let rx = h.session.subscribe();
    let fake = h.client.clone();
    let follower = tokio::spawn(async move {
        let mut board = TicketBoard::new(fake);
        board.follow(rx).await;
        board.tickets().len()
    });

    h.session.init().await;
    while h.client.calls("list_tickets") == 0 {
        tokio::task::yield_now().await;
    }
    h.session.logout();

    let session = h.session;
    let navigator = h.navigator;
    drop(session);
    assert_eq!(follower.await.unwrap(), 0);
    assert_eq!(navigator.current(), Route::Login);
}

#[tokio::test]
async fn test_filter_narrows_visible_tickets() {
    let client = Arc::new(FakeHelpdeskClient::new());
    *client.tickets.lock() = Some(Ok(vec![
        ticket("1", TicketStatus::Open, TicketPriority::Low),
        ticket("2", TicketStatus::Closed, TicketPriority::High),
        ticket("3", TicketStatus::Open, TicketPriority::High),
    ]));
    let mut board = TicketBoard::new(client);
    board
        .sync(&SessionState::Resolved(Some(identity(1, Role::Operator, "o@x.com"))))
        .await;

    board.set_filter(TicketFilter {
        status: Some(TicketStatus::Open),
        priority: Some(TicketPriority::High),
    });
    let ids: Vec<&str> = board.visible().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["3"]);

    board.set_filter(TicketFilter {
        status: Some(TicketStatus::Rejected),
        priority: None,
    });
    assert!(board.empty_state().is_some());
}

#[tokio::test]
async fn test_customer_cannot_create_tickets() {
    let client = Arc::new(FakeHelpdeskClient::new());
    *client.tickets.lock() = Some(Ok(Vec::new()));
    let mut board = TicketBoard::new(client.clone());
    board
        .sync(&SessionState::Resolved(Some(identity(2, Role::Customer, "c@x.com"))))
        .await;

    assert!(!board.can_create());
    let err = board.create_ticket(new_ticket("c@x.com", "Impresora")).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::Forbidden { .. }));
    assert_eq!(client.calls("create_ticket"), 0);
    assert!(board.error().is_some());
}

#[tokio::test]
async fn test_operator_creates_ticket_and_list_refreshes() {
    let client = Arc::new(FakeHelpdeskClient::new());
    *client.tickets.lock() = Some(Ok(Vec::new()));
    *client.created.lock() = Some(Ok(TicketRef { id: "77".to_owned() }));
    let mut board = TicketBoard::new(client.clone());
    board
        .sync(&SessionState::Resolved(Some(identity(5, Role::Operator, "o@x.com"))))
        .await;
    assert!(board.can_create());

    assert!(matches!(
        board.create_ticket(new_ticket(" ", "Impresora")).await,
        Err(HelpdeskError::Validation { .. })
    ));
    assert_eq!(client.calls("create_ticket"), 0);

    *client.tickets.lock() = Some(Ok(vec![ticket("77", TicketStatus::Open, TicketPriority::Medium)]));
    let created = board.create_ticket(new_ticket("c@x.com", "Impresora")).await.unwrap();

    assert_eq!(created.id, "77");
    assert!(client.call_log().contains(&"create_ticket 5 c@x.com".to_owned()));
    assert_eq!(client.calls("list_tickets"), 2);
    assert_eq!(board.tickets().len(), 1);
    assert_eq!(board.error(), None);
}

#[tokio::test]
async fn test_status_change_applies_server_record_or_patches_locally() {
    let client = Arc::new(FakeHelpdeskClient::new());
    *client.tickets.lock() = Some(Ok(vec![ticket("1", TicketStatus::Open, TicketPriority::Low)]));
    let mut board = TicketBoard::new(client.clone());
    board
        .sync(&SessionState::Resolved(Some(identity(5, Role::Operator, "o@x.com"))))
        .await;

    *client.update.lock() = Some(Ok(TicketUpdate::Acknowledged));
    board
        .change_status(&"1".to_owned(), TicketStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(board.tickets()[0].status, TicketStatus::InProgress);

    let mut from_server = ticket("1", TicketStatus::Closed, TicketPriority::Urgent);
    from_server.subject = "renamed".to_owned();
    *client.update.lock() = Some(Ok(TicketUpdate::Full(from_server)));
    board
        .change_priority(&"1".to_owned(), TicketPriority::Urgent)
        .await
        .unwrap();
    assert_eq!(board.tickets()[0].subject, "renamed");
    assert_eq!(board.tickets()[0].status, TicketStatus::Closed);

    *client.update.lock() = Some(Err(HelpdeskError::Service {
        status: 404,
        detail: Some("Ticket no encontrado".to_owned()),
    }));
    assert!(
        board
            .change_status(&"1".to_owned(), TicketStatus::Rejected)
            .await
            .is_err()
    );
    assert_eq!(board.error(), Some("Ticket no encontrado"));
    assert_eq!(board.tickets()[0].status, TicketStatus::Closed);
}

#[tokio::test]
async fn test_report_is_staff_only() {
    let client = FakeHelpdeskClient::new();
    *client.tickets.lock() = Some(Ok(vec![
        ticket("1", TicketStatus::Open, TicketPriority::Low),
        ticket("2", TicketStatus::Closed, TicketPriority::Low),
    ]));

    let customer = identity(2, Role::Customer, "c@x.com");
    assert!(matches!(
        ReportView::load(&client, &customer).await,
        Err(HelpdeskError::Forbidden { .. })
    ));
    assert_eq!(client.calls("list_tickets"), 0);

    let admin = identity(1, Role::Admin, "a@x.com");
    let report = ReportView::load(&client, &admin).await.unwrap();
    assert_eq!(report.summary.total, 2);
    assert_eq!(report.summary.count(TicketStatus::Closed), 1);
    assert!(report.by_priority.contains(&(TicketPriority::Low, 2)));
}

#[tokio::test]
async fn test_report_read_failure_is_empty_with_notice() {
    let client = FakeHelpdeskClient::new();
    let report = ReportView::load(&client, &identity(1, Role::Operator, "o@x.com"))
        .await
        .unwrap();
    assert_eq!(report.summary.total, 0);
    assert!(report.notice.is_some());
}

#[tokio::test]
async fn test_history_ordered_with_operator_on_the_right() {
    let client = FakeHelpdeskClient::new();
    *client.history.lock() = Some(Ok(vec![
        interaction(2, InteractionAuthor::Operator, datetime!(2024-03-02 9:00 UTC)),
        interaction(1, InteractionAuthor::Customer, datetime!(2024-03-01 9:00 UTC)),
    ]));

    let view = TicketHistoryView::load(&client, &"10".to_owned()).await;

    let ids: Vec<i64> = view.entries.iter().map(|e| e.interaction.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(!view.entries[0].align_right);
    assert!(view.entries[1].align_right);
    assert_eq!(view.notice, None);
}

#[tokio::test]
async fn test_history_failure_is_empty_with_notice() {
    let client = FakeHelpdeskClient::new();
    let view = TicketHistoryView::load(&client, &"10".to_owned()).await;
    assert!(view.is_empty());
    assert!(view.notice.is_some());
}

#[tokio::test]
async fn test_user_directory() {
    let client = FakeHelpdeskClient::new();
    *client.users.lock() = Some(Ok(vec![
        identity(1, Role::Operator, "o@x.com"),
        identity(2, Role::Customer, "c@x.com"),
    ]));
    let operator = identity(1, Role::Operator, "o@x.com");

    let mut dir = UserDirectory::load(&client, &operator).await.unwrap();
    assert_eq!(dir.total(), 2);
    assert_eq!(dir.count(Role::Customer), 1);

    let mut promoted = identity(2, Role::Operator, "c@x.com");
    promoted.display_name = "Carla".to_owned();
    *client.updated_user.lock() = Some(Ok(promoted));
    let patch = IdentityPatch {
        role: Some(Role::Operator),
        ..IdentityPatch::default()
    };
    dir.update_user(&client, &operator, 2, &patch).await.unwrap();
    assert_eq!(dir.count(Role::Operator), 2);
    assert_eq!(dir.users()[1].display_name, "Carla");

    *client.updated_user.lock() = Some(Err(HelpdeskError::network("reset")));
    assert!(dir.update_user(&client, &operator, 2, &patch).await.is_err());
    assert_eq!(dir.error(), Some("No se pudo actualizar el usuario"));
}

#[tokio::test]
async fn test_user_directory_refuses_customers() {
    let client = FakeHelpdeskClient::new();
    let customer = identity(2, Role::Customer, "c@x.com");
    assert!(matches!(
        UserDirectory::load(&client, &customer).await,
        Err(HelpdeskError::Forbidden { .. })
    ));
    assert_eq!(client.calls("list_users"), 0);
}
