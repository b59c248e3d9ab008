use reaction_sorter_core::platform::PlatformError;
use reaction_sorter_transport_discord::bot::platform::map_error;
use reaction_sorter_transport_discord::bot::purge::PurgePlan;
use serenity::all::Permissions;
use serenity::model::ModelError;

#[test]
fn missing_permissions_map_to_permission_denied() {
    let err = serenity::Error::Model(ModelError::InvalidPermissions {
        required: Permissions::MANAGE_MESSAGES,
        present: Permissions::SEND_MESSAGES,
    });

    assert!(matches!(map_error(err), PlatformError::PermissionDenied(_)));
}

#[test]
fn other_errors_map_to_request_failed() {
    let err = serenity::Error::Other("gateway closed");

    assert_eq!(
        map_error(err),
        PlatformError::RequestFailed("gateway closed".to_string())
    );
}

#[test]
fn purge_plan_mixes_bulk_and_single_deletes() {
    let now = 1_700_000_000_i64;
    let month = 30 * 24 * 60 * 60;
    let mut messages: Vec<(u64, i64)> = (1..=150).map(|id| (id, now - 120)).collect();
    messages.push((900, now - month));

    let plan = PurgePlan::new(messages, now);

    let sizes: Vec<usize> = plan.bulk.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![100, 50]);
    assert_eq!(plan.single, vec![900]);
    assert_eq!(plan.len(), 151);
}
