//! 职位选择控制器脚手架。

use tracing::warn;

use crate::api::{InterviewBackend, JobPosting, JobSource};

/// 单次职位拉取的状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

impl Default for FetchStatus {
    fn default() -> Self {
        FetchStatus::Idle
    }
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Idle => "idle",
            FetchStatus::Loading => "loading",
            FetchStatus::Loaded => "loaded",
            FetchStatus::Failed(_) => "failed",
        }
    }
}

/// 职位选择面板：持有职位列表、搜索词与当前选择。
#[derive(Debug, Default)]
pub struct JobBoard {
    jobs: Vec<JobPosting>,
    status: FetchStatus,
    search: String,
    selected: Option<JobPosting>,
    picker_open: bool,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.jobs
    }

    pub fn selected(&self) -> Option<&JobPosting> {
        self.selected.as_ref()
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search<S: Into<String>>(&mut self, term: S) {
        self.search = term.into();
    }

    /// 按当前搜索词过滤后的职位视图。
    pub fn visible(&self) -> Vec<&JobPosting> {
        filter_jobs(&self.jobs, &self.search)
    }

    /// 单次拉取：成功则替换列表，失败则清空并记录错误文案。不重试。
    pub async fn load(&mut self, backend: &dyn InterviewBackend, source: JobSource) {
        if self.status == FetchStatus::Loading {
            return;
        }

        self.status = FetchStatus::Loading;

        match backend.list_jobs(source).await {
            Ok(jobs) => {
                self.jobs = jobs;
                self.status = FetchStatus::Loaded;
                self.picker_open = true;
            }
            Err(err) => {
                warn!(
                    target: "job_board",
                    source = source.as_str(),
                    %err,
                    "failed to load job listings"
                );
                self.jobs.clear();
                self.status = FetchStatus::Failed(err.user_message());
            }
        }
    }

    /// 记录选择并关闭选择面板。
    pub fn select(&mut self, job: JobPosting) {
        self.selected = Some(job);
        self.picker_open = false;
    }
}

/// 大小写不敏感的子串过滤，命中标题、公司或地点。空词返回全部。
pub fn filter_jobs<'a>(jobs: &'a [JobPosting], term: &str) -> Vec<&'a JobPosting> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return jobs.iter().collect();
    }

    jobs.iter()
        .filter(|job| {
            job.title.to_lowercase().contains(&needle)
                || job.company.to_lowercase().contains(&needle)
                || job.location_label().to_lowercase().contains(&needle)
        })
        .collect()
}
