use super::*;

/// Tests pinging helpers from a ticket.
///
/// Verifies that the helper role is mentioned in the ticket channel and that a second ping
/// inside the cooldown is refused.
///
/// Expected: First ping Ok, second Err(Cooldown)
#[tokio::test]
async fn ping_helpers_respects_cooldown() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .build()
        .await?;
    let tickets = TicketService::new(&test.state);

    tickets.ping_helpers(&ticket.name, 42).await?;

    let messages = test.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains(&format!("<@&{}>", HELPER)));
    assert!(test.ticket(&ticket.name).await.last_helper_ping.is_some());

    let again = tickets.ping_helpers(&ticket.name, 42).await;
    assert!(matches!(
        again,
        Err(AppError::TicketErr(TicketError::Cooldown { .. }))
    ));
    assert_eq!(test.notifier.messages().len(), 1);

    Ok(())
}

/// Tests that the cooldown ends.
///
/// Expected: Ok after the last ping is older than the cooldown
#[tokio::test]
async fn ping_helpers_after_cooldown() -> Result<(), AppError> {
    let test = TestState::new().await;
    let ticket = TicketFactory::new(test.db())
        .requester_id("42")
        .last_helper_ping(Utc::now() - Duration::minutes(10))
        .build()
        .await?;

    TicketService::new(&test.state)
        .ping_helpers(&ticket.name, 42)
        .await?;

    assert_eq!(test.notifier.messages().len(), 1);

    Ok(())
}

/// Tests that only the requester or an admin may ping helpers.
///
/// Expected: Err(Unauthorized) and no message
#[tokio::test]
async fn ping_helpers_requires_requester() -> Result<(), AppError> {
    let test = TestState::new().await;
    test.helpers(&[11]);
    let ticket = factory::create_ticket(test.db()).await?;

    let result = TicketService::new(&test.state)
        .ping_helpers(&ticket.name, 11)
        .await;

    assert!(matches!(
        result,
        Err(AppError::TicketErr(TicketError::Unauthorized))
    ));
    assert!(test.notifier.messages().is_empty());

    Ok(())
}

/// Tests restoring panels after a restart.
///
/// Verifies that an existing panel is edited in place, a ticket without a panel gets a new
/// one, and tickets without a live channel are skipped.
///
/// Expected: 2 panels restored, one edited and one rendered
#[tokio::test]
async fn restores_panels_of_open_tickets() -> Result<(), AppError> {
    let test = TestState::new().await;
    let with_panel = factory::create_ticket(test.db()).await?;
    let without_panel = factory::create_ticket(test.db()).await?;
    let gone = factory::create_ticket(test.db()).await?;
    TicketFactory::new(test.db()).channel_id(None).build().await?;
    TicketFactory::new(test.db())
        .status("completed")
        .build()
        .await?;

    let repo = TicketRepository::new(test.db());
    let channel_of = |model: &entity::ticket::Model| -> u64 {
        model.channel_id.as_deref().unwrap().parse().unwrap()
    };
    repo.set_panel(&with_panel.name, channel_of(&with_panel), Some(1))
        .await?;
    test.notifier.remove_channel(channel_of(&gone));

    let restored = TicketService::new(&test.state)
        .restore_open_tickets()
        .await?;

    assert_eq!(restored, 2);
    assert_eq!(test.notifier.panels_updated(), 1);
    assert_eq!(test.notifier.panels_rendered(), 1);
    assert!(test.ticket(&without_panel.name).await.message_id.is_some());
    assert_eq!(test.ticket(&gone.name).await.message_id, None);

    Ok(())
}
