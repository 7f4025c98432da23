/// Track state enumeration for the track lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum TrackState {
    /// Newly created track, not yet trusted enough to report
    #[default]
    Tentative,
    /// Matched often enough to be reported
    Confirmed,
    /// Terminal; removed from the live set in the frame it is entered
    Deleted,
}
