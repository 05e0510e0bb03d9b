#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportStats {
    pub added: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManagerView {
    pub tags: Vec<String>,
    pub count: usize,
    pub last_import: Option<ImportStats>,
    pub dirty: bool,
}
