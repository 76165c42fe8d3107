//! Walks through every users operation against a public JSON API.
//!
//! Run with: `cargo run --example users`
//! Set `RUST_LOG=safecall=debug` to see request-level logging.

use safecall::users::{self, Address, Company, Geo, NewUser, UserPatch};
use safecall::{ApiError, Client, ErrorCode, ResultTuple};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn report(label: &str, err: &ApiError) {
    println!(
        "{label}: [{}] status={} message={}",
        err.code().map_or("-", |code| code.as_str()),
        err.status(),
        err
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("safecall=info")),
        )
        .init();

    let client = Client::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .timeout(Duration::from_secs(10))
        .build()?;
    let users = users::users(client);

    println!("=== list ===");
    match users.list().await {
        Ok(all) => println!("{} users", all.len()),
        Err(err) => report("list failed", &err),
    }

    println!("=== get ===");
    match users.get(1).await {
        Ok(user) => println!("#{} {} <{}>", user.id, user.name, user.email),
        Err(err) => report("get failed", &err),
    }
    match users.get(9999).await {
        Ok(user) => println!("unexpected user {}", user.name),
        Err(err) if err.has_code(&ErrorCode::NotFound) => report("missing user", &err),
        Err(err) => report("get failed", &err),
    }

    println!("=== validation happens before any request ===");
    if let Err(err) = users.get(-1).await {
        report("get(-1)", &err);
    }
    if let Err(err) = users.find_by_email("test..test@example.com").await {
        report("find_by_email", &err);
    }

    println!("=== find_by ===");
    let (ok, data, err) = ResultTuple::from(users.find_by_email("nobody@example.com").await).into_parts();
    println!("ok={ok} matches={:?} error={:?}", data.map(|d| d.len()), err.map(|e| e.to_record()));

    println!("=== create / update / delete ===");
    let payload = NewUser {
        name: "New User".to_string(),
        username: "new.user".to_string(),
        email: "new@example.com".to_string(),
        address: Address {
            street: "Main St".to_string(),
            suite: "1".to_string(),
            city: "Springfield".to_string(),
            zipcode: "12345".to_string(),
            geo: Geo {
                lat: "0".to_string(),
                lng: "0".to_string(),
            },
        },
        phone: "555-0100".to_string(),
        website: "new.example.com".to_string(),
        company: Company {
            name: "Acme".to_string(),
            catch_phrase: "We make things".to_string(),
            bs: "synergize".to_string(),
        },
    };
    match users.create(&payload).await {
        Ok(user) => println!("created #{}", user.id),
        Err(err) => report("create failed", &err),
    }

    match users.update(1, &UserPatch::default()).await {
        Ok(user) => println!("unchanged: {}", user.name),
        Err(err) => report("update failed", &err),
    }

    let wire = serde_json::to_string(&ResultTuple::from(users.delete(1).await))?;
    println!("delete -> {wire}");

    Ok(())
}
