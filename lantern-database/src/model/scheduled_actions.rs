/// A due scheduled unban, joined with its originating tempban case.
///
/// The case back-reference is weak: the source case may have been deleted,
/// so its columns are optional.
#[derive(Clone, Debug)]
pub struct DueUnban {
    pub id: u64,
    pub guild_id: u64,
    pub target_id: u64,
    pub case_id: u64,
    pub execute_at: u64,
    pub source_case_number: Option<u64>,
    pub source_target_tag: Option<String>,
}
