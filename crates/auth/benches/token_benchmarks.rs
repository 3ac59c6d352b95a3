use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use securefile_auth::{Authorizer, ClaimSet, RandomTokenIds, TokenService, TokenSettings};
use securefile_core::{ResourceId, SystemClock, UserId};

fn service() -> TokenService {
    TokenService::new(
        TokenSettings::new("bench-secret-bench-secret-bench-secret", "securefile", "clients", 15),
        Arc::new(SystemClock),
        Arc::new(RandomTokenIds),
    )
    .expect("valid settings")
}

fn bench_issue(c: &mut Criterion) {
    let svc = service();
    let user = UserId::new();
    let groups = ["team:rw", "docs:ro", "archive:ro"];

    c.bench_function("issue_user_token", |b| {
        b.iter(|| {
            svc.issue_user_token(black_box(user), "Bench User", "bench@example.com", &groups, None)
                .expect("issued")
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let svc = service();
    let token = svc
        .issue_user_token(UserId::new(), "Bench User", "bench@example.com", &["team:rw"], None)
        .expect("issued");

    c.bench_function("validate_token", |b| b.iter(|| svc.validate_token(black_box(&token))));
}

fn bench_read_check(c: &mut Criterion) {
    let id = ResourceId::new();
    let claims = ClaimSet::new()
        .with("groups", "docs:ro")
        .with("groups", "team:rw")
        .with("scope", format!("files:create files:read:{id}"));

    c.bench_function("can_perform_read_group_and_id", |b| {
        b.iter(|| Authorizer::new(&claims).can_perform_read("files", black_box(Some("docs")), Some(id)))
    });
}

criterion_group!(benches, bench_issue, bench_validate, bench_read_check);
criterion_main!(benches);
