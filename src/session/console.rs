//! 终端交互驱动：把流程更新渲染到标准输出，把输入行转成流程指令。

use std::io::Write as _;
use std::path::Path;

use anyhow::Result;
use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::api::{JobPosting, JobSource};
use crate::flow::{FlowUpdatePayload, InterviewStage};
use crate::jobs::{FetchStatus, JobBoard};
use crate::session::SessionManager;

type InputLines = Lines<BufReader<Stdin>>;

pub async fn run(mut manager: SessionManager) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(job) = pick_job(&manager, &mut lines).await? {
        println!(
            "Selected {} - {} ({})",
            job.title,
            job.company,
            job.location_label()
        );
    }

    let Some(path) = prompt_line(&mut lines, "Path to a resume file (PDF/DOCX):").await? else {
        return Ok(());
    };

    let payload = tokio::fs::read(&path).await?;
    let file_name = Path::new(&path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("resume.pdf")
        .to_string();

    let text = manager
        .upload_resume(&file_name, Bytes::from(payload))
        .await?;
    println!("Resume parsed ({} characters).", text.chars().count());

    let analysis = manager.analyze().await?;
    println!("Fit score: {}/100", analysis.score);
    println!("{}", analysis.intro);

    run_interview(&manager, &mut lines, analysis.score).await
}

async fn prompt_line(lines: &mut InputLines, prompt: &str) -> Result<Option<String>> {
    println!("{prompt}");

    loop {
        match lines.next_line().await? {
            Some(line) if !line.trim().is_empty() => return Ok(Some(line.trim().to_string())),
            Some(_) => continue,
            None => return Ok(None),
        }
    }
}

async fn pick_job(manager: &SessionManager, lines: &mut InputLines) -> Result<Option<JobPosting>> {
    let backend = manager.backend();
    let mut board = JobBoard::new();
    board.load(backend.as_ref(), JobSource::Curated).await;

    if let FetchStatus::Failed(message) = board.status() {
        println!("Failed to load jobs: {message}");
        return Ok(None);
    }

    loop {
        render_jobs(&board);
        println!("Pick a job by number, or type text to filter (empty shows all):");

        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        let line = line.trim().to_string();

        if let Ok(index) = line.parse::<usize>() {
            let picked = board
                .visible()
                .get(index.wrapping_sub(1))
                .map(|job| (*job).clone());

            if let Some(job) = picked {
                board.select(job.clone());
                return Ok(Some(job));
            }
            println!("No such entry.");
        } else {
            board.set_search(line);
        }
    }
}

fn render_jobs(board: &JobBoard) {
    let visible = board.visible();
    if visible.is_empty() {
        println!("No jobs match the current filter.");
        return;
    }

    for (index, job) in visible.iter().enumerate() {
        println!(
            "{:>2}. {} - {} ({})",
            index + 1,
            job.title,
            job.company,
            job.location_label()
        );
    }
}

async fn run_interview(
    manager: &SessionManager,
    lines: &mut InputLines,
    score: u32,
) -> Result<()> {
    'session: loop {
        let (handle, mut updates) = manager.start_interview();

        println!("Press Enter to start the interview (/quit to exit).");
        match lines.next_line().await? {
            Some(line) if line.trim() == "/quit" => return Ok(()),
            Some(_) => {}
            None => return Ok(()),
        }

        handle.start().await?;
        println!("Answer with a line of text. Commands: /mic, /restart, /quit.");

        let mut announced_closing = false;

        // 推进到总结页，期间转发输入行为指令。
        let summary = loop {
            tokio::select! {
                maybe_update = updates.recv() => {
                    let Some(update) = maybe_update else {
                        return Ok(());
                    };

                    match update.payload {
                        FlowUpdatePayload::Reveal(progress) => {
                            print!("\r{}", progress.revealed);
                            let _ = std::io::stdout().flush();
                            if progress.done {
                                println!();
                            }
                        }
                        FlowUpdatePayload::Notice(notice) => {
                            println!("[{}] {}", notice.level.as_str(), notice.message);
                        }
                        FlowUpdatePayload::State(state) => {
                            if state.auto_closing && !announced_closing {
                                announced_closing = true;
                                println!("{}", state.question);
                            }

                            if state.stage == InterviewStage::Summary {
                                break state.summary;
                            }
                        }
                    }
                }

                maybe_line = lines.next_line() => {
                    let Some(line) = maybe_line? else {
                        return Ok(());
                    };

                    match line.trim() {
                        "" => {}
                        "/quit" => return Ok(()),
                        "/restart" => continue 'session,
                        "/mic" => {
                            if !manager.capture_voice_answer(&handle).await? {
                                println!("Microphone not available in this environment.");
                            }
                        }
                        answer => {
                            handle.edit_answer(answer).await?;
                            handle.submit().await?;
                        }
                    }
                }
            }
        };

        println!("=== Interview completed ===");
        println!("Final score: {score}/100");
        println!("{summary}");
        println!("Type /restart for another round, anything else to exit.");

        match lines.next_line().await? {
            Some(line) if line.trim() == "/restart" => continue 'session,
            _ => return Ok(()),
        }
    }
}
