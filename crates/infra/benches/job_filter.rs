use chrono::Utc;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use talentbridge_core::UserId;
use talentbridge_jobs::{
    ExperienceLevel, Job, JobFilter, JobType, NewJob, RemoteStatus,
};

fn catalog(size: usize) -> Vec<Job> {
    (0..size)
        .map(|i| {
            Job::post(
                NewJob {
                    employer_id: UserId::new(),
                    title: format!("Engineer {i}"),
                    company_name: Some(format!("Company {}", i % 50)),
                    description: "Build, ship, repeat.".to_string(),
                    requirements: "Rust, SQL".to_string(),
                    location: if i % 3 == 0 { "Berlin" } else { "Lisbon" }.to_string(),
                    salary: Some(40_000 + (i as i64 % 10) * 10_000),
                    salary_range: None,
                    job_type: if i % 2 == 0 {
                        JobType::FullTime
                    } else {
                        JobType::Contract
                    },
                    remote_status: RemoteStatus::Remote,
                    experience_level: ExperienceLevel::Mid,
                    deadline: None,
                },
                None,
                Utc::now(),
            )
            .unwrap()
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let jobs = catalog(1_000);
    let filter = JobFilter {
        job_type: Some(JobType::FullTime),
        location: Some("ber".to_string()),
        min_salary: Some(60_000),
        search: Some("engineer".to_string()),
        ..Default::default()
    };

    c.bench_function("job_filter_match_1k", |b| {
        b.iter(|| {
            let hits = jobs.iter().filter(|j| filter.matches(j)).count();
            black_box(hits)
        })
    });
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
