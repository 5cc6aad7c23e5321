use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tavern::auth::{AuthService, HashCost, Passwords, Tokens};
use tavern::currency::{self, BRONZE};
use tavern::games::GameService;
use tavern::validation::{CreateGameInput, Credentials};
use tavern::Database;

fn cheap_cost() -> HashCost {
    HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

// Benchmark for static validation of a well-formed request
fn bench_validate_input(c: &mut Criterion) {
    let input = CreateGameInput {
        currency_id: Some(1),
        bet: Some(500),
        winning_points: Some(5000),
        join_type: Some("anyone".to_string()),
    };
    c.bench_function("validate_create_game_input", |b| {
        b.iter(|| black_box(input.validate()))
    });
}

// Benchmark for the funds check plus insert on an in-memory database
fn bench_create_game(c: &mut Criterion) {
    let db = Database::open_in_memory().unwrap();
    let auth = AuthService::new(
        db.clone(),
        Passwords::new(cheap_cost()).unwrap(),
        Tokens::new(b"bench-secret"),
        u64::MAX >> 2,
    );
    let token = auth
        .register(&Credentials::new("bench", "bench-password"))
        .unwrap();
    let user = auth.authenticate(&token).unwrap();
    let bronze = db
        .read(|conn| Ok(currency::find_by_slug(conn, BRONZE)?.unwrap()))
        .unwrap();

    let games = GameService::new(db);
    let game = CreateGameInput {
        currency_id: Some(bronze.id),
        bet: Some(100),
        winning_points: Some(5000),
        join_type: Some("friends".to_string()),
    }
    .validate()
    .unwrap();

    c.bench_function("create_game", |b| {
        b.iter(|| black_box(games.create_game(user.id, &game).unwrap()))
    });
}

// Benchmark for token verification plus user lookup
fn bench_authenticate(c: &mut Criterion) {
    let db = Database::open_in_memory().unwrap();
    let auth = AuthService::new(
        db,
        Passwords::new(cheap_cost()).unwrap(),
        Tokens::new(b"bench-secret"),
        1000,
    );
    let token = auth
        .register(&Credentials::new("bench", "bench-password"))
        .unwrap();

    c.bench_function("authenticate", |b| {
        b.iter(|| black_box(auth.authenticate(&token).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_validate_input,
    bench_create_game,
    bench_authenticate
);
criterion_main!(benches);
