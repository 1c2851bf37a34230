//! TypeScript Generation Tests
//!
//! Validates that view models can be exported to TypeScript when the tauri
//! feature is enabled.

#[cfg(feature = "tauri")]
#[test]
fn test_view_types_implement_specta_type() {
    use specta::Type;

    // If this compiles, every type a front end receives is exportable.
    fn assert_type<T: Type>() {}

    assert_type::<pitboard::Leaderboard>();
    assert_type::<pitboard::view::LeaderboardRow>();
    assert_type::<pitboard::view::SessionSummary>();
    assert_type::<pitboard::SessionView>();
    assert_type::<pitboard::ScheduleView>();
    assert_type::<pitboard::FeedState>();
    assert_type::<pitboard::GapSource>();
    assert_type::<pitboard::ParticipantStatus>();
    assert_type::<pitboard::SessionStatus>();
    assert_type::<pitboard::LapTime>();
    assert_type::<pitboard::UpdateRate>();
}

#[cfg(not(feature = "tauri"))]
#[test]
fn test_tauri_feature_disabled() {
    // Types still compile without specta::Type
    let _ = pitboard::UpdateRate::Native;
    let _ = pitboard::GapSource::default();
}
