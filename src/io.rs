//! Instance loading and trace rendering.
//!
//! These are boundary helpers for the command-line front end; the solver
//! modules never call them.
//!
//! # Instance format
//!
//! ```text
//! jobs = 3
//! machines = 2
//!
//! proc_time =
//! 4  3
//! 2  5
//! 6  1
//!
//! setup_time =
//! # machine 1
//! 0  1  2
//! 1  0  1
//! 2  1  0
//! # machine 2
//! ...
//! ```
//!
//! Blank lines are ignored. Each `# machine` block holds the `jobs × jobs`
//! matrix `setup[prev][next]` for that machine, in machine order. Rows and
//! blocks must match the header exactly; surplus data is an error.

use std::io::Write;
use std::path::Path;

use crate::error::{FlowShopError, Result};
use crate::instance::ProblemInstance;
use crate::neh::NehEvent;
use crate::schedule::{Schedule, SlotTrace};

/// Reads and parses an instance file.
pub fn load_instance(path: impl AsRef<Path>) -> Result<ProblemInstance> {
    let text = std::fs::read_to_string(path)?;
    parse_instance(&text)
}

/// Parses an instance from text.
///
/// # Errors
///
/// [`FlowShopError::InvalidInstance`] on a missing header, a missing,
/// short or overlong row, data outside the sections the header announces,
/// a non-integer token, or a negative duration.
pub fn parse_instance(text: &str) -> Result<ProblemInstance> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    let mut jobs = None;
    let mut machines = None;
    let mut found_processing = false;
    for (number, line) in lines.by_ref() {
        if line.contains("proc_time") {
            found_processing = true;
            break;
        }
        if line.contains("jobs") {
            jobs = Some(header_value(line, number)?);
        } else if line.contains("machines") {
            machines = Some(header_value(line, number)?);
        }
    }

    let jobs = jobs.ok_or_else(|| FlowShopError::instance("missing `jobs = N` header"))?;
    let machines =
        machines.ok_or_else(|| FlowShopError::instance("missing `machines = M` header"))?;
    if !found_processing {
        return Err(FlowShopError::instance("missing `proc_time` section"));
    }

    let mut processing_time = Vec::with_capacity(jobs);
    for job in 0..jobs {
        let row = if machines == 0 {
            Vec::new()
        } else {
            let (number, line) = next_data_row(&mut lines)
                .ok_or_else(|| eof(format!("processing times of job {job}")))?;
            parse_row(line, machines, number)?
        };
        processing_time.push(row);
    }

    let mut setup_time = Vec::with_capacity(machines);
    for machine in 0..machines {
        seek_machine_header(&mut lines, machine)?;

        let mut matrix = Vec::with_capacity(jobs);
        for prev in 0..jobs {
            let (number, line) = next_data_row(&mut lines).ok_or_else(|| {
                eof(format!("setup row {prev} of machine {}", machine + 1))
            })?;
            matrix.push(parse_row(line, jobs, number)?);
        }
        setup_time.push(matrix);
    }

    // Without machines there are no blocks, but the section header may remain.
    let mut section_allowed = machines == 0;
    while let Some((number, line)) = next_data_row(&mut lines) {
        if section_allowed && line.contains("setup_time") {
            section_allowed = false;
            continue;
        }
        return Err(FlowShopError::instance(format!(
            "line {number}: unexpected data after the last setup block: `{}`",
            line.trim()
        )));
    }

    ProblemInstance::new(jobs, machines, processing_time, setup_time)
}

fn header_value(line: &str, number: usize) -> Result<usize> {
    let value = line
        .split_once('=')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| FlowShopError::instance(format!("line {number}: expected `key = value`")))?;
    value.parse().map_err(|_| {
        FlowShopError::instance(format!("line {number}: `{value}` is not a count"))
    })
}

/// Advances past the `# machine` header opening the block of `machine`.
/// Only the `setup_time =` section header may come before the first block.
fn seek_machine_header<'a, I>(lines: &mut I, machine: usize) -> Result<()>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    let mut section_allowed = machine == 0;
    loop {
        let (number, line) = next_data_row(lines)
            .ok_or_else(|| eof(format!("setup block for machine {}", machine + 1)))?;
        if line.contains("# machine") {
            return Ok(());
        }
        if section_allowed && line.contains("setup_time") {
            section_allowed = false;
            continue;
        }
        return Err(FlowShopError::instance(format!(
            "line {number}: expected `# machine {}`, got `{}`",
            machine + 1,
            line.trim()
        )));
    }
}

fn next_data_row<'a, I>(lines: &mut I) -> Option<(usize, &'a str)>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    lines.find(|(_, line)| !line.trim().is_empty())
}

fn parse_row(line: &str, expected: usize, number: usize) -> Result<Vec<u64>> {
    let mut row = Vec::with_capacity(expected);
    let mut tokens = line.split_whitespace();
    for token in tokens.by_ref().take(expected) {
        let value: i64 = token.parse().map_err(|_| {
            FlowShopError::instance(format!("line {number}: `{token}` is not an integer"))
        })?;
        let value = u64::try_from(value).map_err(|_| {
            FlowShopError::instance(format!("line {number}: negative duration {value}"))
        })?;
        row.push(value);
    }
    if row.len() != expected {
        return Err(FlowShopError::instance(format!(
            "line {number}: expected {expected} values, got {}",
            row.len()
        )));
    }
    if let Some(extra) = tokens.next() {
        return Err(FlowShopError::instance(format!(
            "line {number}: expected {expected} values, found extra `{extra}`"
        )));
    }
    Ok(row)
}

fn eof(what: String) -> FlowShopError {
    FlowShopError::instance(format!("unexpected end of input while reading {what}"))
}

/// Writes `trace` as visualizer slot lines followed by an end-of-frame
/// marker tagged with `label`.
///
/// ```text
/// SLOT;iter=FINAL;machine=0;prev=-1;job=2;setup=0;start=0;end=6
/// FRAME_END;iter=FINAL
/// ```
pub fn write_trace<W: Write>(out: &mut W, trace: &SlotTrace, label: &str) -> Result<()> {
    for record in trace.records() {
        let prev = record.previous_job.map_or(-1, |job| job as i64);
        writeln!(
            out,
            "SLOT;iter={label};machine={};prev={prev};job={};setup={};start={};end={}",
            record.machine, record.job, record.setup, record.start, record.end
        )?;
    }
    writeln!(out, "FRAME_END;iter={label}")?;
    Ok(())
}

/// Writes a result line and the `END` terminator.
///
/// ```text
/// NEH_RESULT;perm=1,0,2;cmax=13
/// END
/// ```
pub fn write_result<W: Write>(
    out: &mut W,
    prefix: &str,
    schedule: &Schedule,
    makespan: u64,
) -> Result<()> {
    let perm = join(schedule.sequence());
    writeln!(out, "{prefix}_RESULT;perm={perm};cmax={makespan}")?;
    writeln!(out, "END")?;
    Ok(())
}

/// Writes one NEH insertion round: the choice line (omitted for the first
/// job, which has no alternatives), the progress line, and a slot frame of
/// the partial sequence labelled with the round number.
///
/// ```text
/// NEH_CHOICE;iter=2;job=1;best_pos=0;cmax_after=10
/// NEH_PROGRESS;iter=2;percent=66.7;cmax=10;delta=-3;seq=1,0
/// SLOT;iter=2;machine=0;prev=-1;job=1;setup=0;start=0;end=2
/// ...
/// FRAME_END;iter=2
/// ```
pub fn write_neh_step<W: Write>(
    out: &mut W,
    instance: &ProblemInstance,
    event: &NehEvent<'_>,
) -> Result<()> {
    if event.step > 1 {
        writeln!(
            out,
            "NEH_CHOICE;iter={};job={};best_pos={};cmax_after={}",
            event.step, event.job, event.position, event.makespan
        )?;
    }
    let percent = event.step as f64 / instance.job_count().max(1) as f64 * 100.0;
    writeln!(
        out,
        "NEH_PROGRESS;iter={};percent={percent:.1};cmax={};delta={};seq={}",
        event.step,
        event.makespan,
        event.delta,
        join(event.sequence)
    )?;

    let trace = SlotTrace::replay_sequence(instance, event.sequence)?;
    write_trace(out, &trace, &event.step.to_string())
}

fn join(sequence: &[usize]) -> String {
    sequence
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
