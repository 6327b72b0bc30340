use std::{path::PathBuf, process::ExitCode};

use {
    serde::Serialize,
    skillport_skills::{
        Defect, MaterializeOptions, Materialized, ProjectionEngine, ProjectionReport, SkillStore,
        Template, validate_store,
    },
};

pub struct NewSkill {
    pub skill: String,
    pub description: Option<String>,
    pub with_references: bool,
    pub from: Option<PathBuf>,
    pub link: bool,
}

pub fn init(store: &SkillStore) -> anyhow::Result<ExitCode> {
    store.ensure_categories()?;
    for category in &store.config().categories {
        println!("  {}", store.config().skills_dir.join(category).display());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn new_skill(store: &SkillStore, args: NewSkill) -> anyhow::Result<ExitCode> {
    let skill = store.skill(&args.skill)?;
    let outcome = store.materialize(&skill, &MaterializeOptions {
        source: args.from,
        template: Template::Authored {
            description: args.description,
        },
        with_references: args.with_references,
    })?;

    let dir = store.skill_dir(&skill);
    match outcome {
        Materialized::Created => println!("{:>10}  {}", "create", dir.display()),
        Materialized::Copied { from } => {
            println!("{:>10}  {} <- {}", "copy", dir.display(), from.display());
        },
        Materialized::Exists => println!("{:>10}  {}", "exist", dir.display()),
    }

    if !args.link {
        return Ok(ExitCode::SUCCESS);
    }
    let report = ProjectionEngine::for_store(store).project_skill(&skill);
    Ok(print_projection(&report, false)?)
}

pub fn link(
    store: &SkillStore,
    skills: &[String],
    category: Option<&str>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let engine = ProjectionEngine::for_store(store);
    let report = match category {
        Some(category) => engine.project_category(category)?,
        None if skills.is_empty() => engine.project_all(),
        None => {
            // Resolve every name first so a typo leaves the targets untouched.
            let skills = skills
                .iter()
                .map(|raw| store.skill(raw))
                .collect::<skillport_skills::Result<Vec<_>>>()?;
            let mut report = ProjectionReport::default();
            for skill in &skills {
                report.merge(engine.project_skill(skill));
            }
            report
        },
    };
    Ok(print_projection(&report, json)?)
}

#[derive(Serialize)]
struct FileReport {
    path: PathBuf,
    valid: bool,
    defects: Vec<Defect>,
}

pub fn validate(store: &SkillStore, files: &[PathBuf], json: bool) -> anyhow::Result<ExitCode> {
    let reports: Vec<FileReport> = if files.is_empty() {
        validate_store(store)?
            .into_iter()
            .map(|r| FileReport {
                valid: r.is_valid(),
                path: r.path,
                defects: r.defects,
            })
            .collect()
    } else {
        files
            .iter()
            .map(|path| {
                let defects = skillport_skills::validate(path)?;
                Ok(FileReport {
                    path: path.clone(),
                    valid: defects.is_empty(),
                    defects,
                })
            })
            .collect::<skillport_skills::Result<_>>()?
    };

    let all_valid = reports.iter().all(|r| r.valid);
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if reports.is_empty() {
        println!("No skills found.");
    } else {
        for report in &reports {
            if report.valid {
                println!("{:>10}  {}", "ok", report.path.display());
            }
            for defect in &report.defects {
                println!("{:>10}  {}: {defect}", "invalid", report.path.display());
            }
        }
    }

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[derive(Serialize)]
struct ListedSkill {
    skill: String,
    name: String,
    path: PathBuf,
    valid: bool,
}

pub fn list(store: &SkillStore, json: bool) -> anyhow::Result<ExitCode> {
    let listed: Vec<ListedSkill> = validate_store(store)?
        .into_iter()
        .map(|r| ListedSkill {
            name: r.skill.leaf().to_string(),
            skill: r.skill.to_string(),
            valid: r.is_valid(),
            path: r.path,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else if listed.is_empty() {
        println!("No skills found.");
    } else {
        for skill in &listed {
            let marker = if skill.valid { "" } else { " [invalid]" };
            println!("  {} ({}){marker}", skill.name, skill.skill);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_projection(report: &ProjectionReport, json: bool) -> serde_json::Result<ExitCode> {
    if json {
        let failures: Vec<String> = report.failures.iter().map(ToString::to_string).collect();
        let value = serde_json::json!({
            "entries": report.entries,
            "failures": failures,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        for entry in &report.entries {
            let shown = entry.target.join(entry.skill.leaf());
            match entry.status {
                skillport_skills::ProjectionStatus::Symlink => println!(
                    "{:>10}  {} -> {}",
                    entry.status,
                    shown.display(),
                    entry.points_to.display()
                ),
                skillport_skills::ProjectionStatus::Exists => {
                    println!("{:>10}  {}", entry.status, shown.display());
                },
            }
        }
        for failure in &report.failures {
            eprintln!("{:>10}  {failure}", "error");
        }
    }

    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
