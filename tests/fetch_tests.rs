use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use mockito::{Matcher, Mock, ServerGuard};
use pokedex_card::projector::NO_DESCRIPTION_ES;
use pokedex_card::state::{Controller, Transition, ViewState};
use pokedex_card::{FetchError, Identifier, PokeApiClient, Settings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

fn client(server: &ServerGuard) -> PokeApiClient {
    client_at(&server.url(), Duration::from_secs(5))
}

fn client_at(base_url: &str, timeout: Duration) -> PokeApiClient {
    let settings = Settings {
        base_url: base_url.to_string(),
        language: "es".to_string(),
        timeout,
        ..Settings::default()
    };
    PokeApiClient::new(&settings).unwrap()
}

/// Reads one request head and returns its path.
fn read_request_path(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    let _ = reader.read_line(&mut request_line);
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
    }
    request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

/// Answers `/pokemon/...` with `primary` and hangs up on every other path
/// without writing a byte.
fn serve_primary_then_hang_up(primary: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let path = read_request_path(&stream);
            if path.starts_with("/pokemon/") {
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    primary.len(),
                    primary
                );
                let _ = stream.write_all(response.as_bytes());
            }
        }
    });
    format!("http://{}", addr)
}

fn stat(name: &str, base: u32) -> serde_json::Value {
    json!({
        "base_stat": base,
        "effort": 0,
        "stat": { "name": name, "url": format!("https://pokeapi.co/api/v2/stat/{}/", name) }
    })
}

fn primary_body(id: u32, name: &str) -> String {
    json!({
        "id": id,
        "name": name,
        "base_experience": 64,
        "height": 7,
        "sprites": {
            "front_default": format!("https://img.test/{}.png", id),
            "back_default": null
        },
        "stats": [
            stat("hp", 45),
            stat("attack", 49),
            stat("defense", 49),
            stat("special-attack", 65),
            stat("special-defense", 65),
            stat("speed", 45)
        ]
    })
    .to_string()
}

fn flavor(lang: &str, text: &str) -> serde_json::Value {
    json!({
        "flavor_text": text,
        "language": { "name": lang, "url": "https://pokeapi.co/api/v2/language/0/" },
        "version": { "name": "red", "url": "https://pokeapi.co/api/v2/version/1/" }
    })
}

fn species_body(entries: Vec<serde_json::Value>) -> String {
    json!({ "id": 1, "name": "bulbasaur", "flavor_text_entries": entries }).to_string()
}

async fn mock_json(server: &mut ServerGuard, path: &str, body: String, expect: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(expect)
        .create_async()
        .await
}

async fn mock_status(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .expect(1)
        .create_async()
        .await
}

async fn no_species_request(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", Matcher::Regex(r"^/pokemon-species/".to_string()))
        .expect(0)
        .create_async()
        .await
}

#[tokio::test]
async fn fetches_bulbasaur_by_id() {
    let mut server = mockito::Server::new_async().await;
    let primary = mock_json(&mut server, "/pokemon/1", primary_body(1, "bulbasaur"), 1).await;
    let species = mock_json(
        &mut server,
        "/pokemon-species/1",
        species_body(vec![
            flavor("en", "A strange seed was\nplanted on its\u{c}back at birth."),
            flavor("es", "Una rara semilla le fue plantada en el lomo al nacer."),
            flavor("es", "Otra entrada."),
        ]),
        1,
    )
    .await;

    let id = pokedex_card::validate("1").unwrap();
    let model = client(&server).fetch(Some(id)).await.unwrap();

    assert_eq!(model.id, 1);
    assert_eq!(model.name, "bulbasaur");
    assert_eq!(model.image.as_deref(), Some("https://img.test/1.png"));
    assert_eq!(
        (model.hp, model.attack, model.defense, model.special),
        (45, 49, 49, 65)
    );
    assert_eq!(
        model.description,
        "Una rara semilla le fue plantada en el lomo al nacer."
    );

    primary.assert_async().await;
    species.assert_async().await;
}

#[tokio::test]
async fn falls_back_when_language_is_missing() {
    let mut server = mockito::Server::new_async().await;
    mock_json(&mut server, "/pokemon/1", primary_body(1, "bulbasaur"), 1).await;
    mock_json(
        &mut server,
        "/pokemon-species/1",
        species_body(vec![flavor("en", "A strange seed.")]),
        1,
    )
    .await;

    let model = client(&server)
        .fetch(Some(pokedex_card::validate("1").unwrap()))
        .await
        .unwrap();
    assert_eq!(model.description, NO_DESCRIPTION_ES);
}

#[tokio::test]
async fn species_follows_the_canonical_id() {
    let mut server = mockito::Server::new_async().await;
    mock_json(&mut server, "/pokemon/10", primary_body(25, "pikachu"), 1).await;
    let wrong = mock_json(&mut server, "/pokemon-species/10", species_body(vec![]), 0).await;
    let right = mock_json(&mut server, "/pokemon-species/25", species_body(vec![]), 1).await;

    let model = client(&server)
        .fetch(Some(pokedex_card::validate("10").unwrap()))
        .await
        .unwrap();
    assert_eq!(model.id, 25);
    assert_eq!(model.name, "pikachu");

    wrong.assert_async().await;
    right.assert_async().await;
}

#[tokio::test]
async fn primary_failure_never_requests_species() {
    let mut server = mockito::Server::new_async().await;
    let primary = mock_status(&mut server, "/pokemon/2", 500).await;
    let species = no_species_request(&mut server).await;

    let err = client(&server)
        .fetch(Some(pokedex_card::validate("2").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err:?}");

    primary.assert_async().await;
    species.assert_async().await;
}

#[tokio::test]
async fn not_found_is_a_network_failure() {
    let mut server = mockito::Server::new_async().await;
    mock_status(&mut server, "/pokemon/3", 404).await;

    let err = client(&server)
        .fetch(Some(pokedex_card::validate("3").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn malformed_primary_is_a_decode_failure() {
    let mut server = mockito::Server::new_async().await;
    mock_json(&mut server, "/pokemon/4", r#"{"id": "four"}"#.to_string(), 1).await;
    let species = no_species_request(&mut server).await;

    let err = client(&server)
        .fetch(Some(pokedex_card::validate("4").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    species.assert_async().await;
}

#[tokio::test]
async fn missing_stat_is_a_decode_failure() {
    let mut server = mockito::Server::new_async().await;
    let body = json!({
        "id": 5,
        "name": "charmeleon",
        "sprites": { "front_default": null },
        "stats": [stat("hp", 58), stat("attack", 64), stat("defense", 58)]
    })
    .to_string();
    mock_json(&mut server, "/pokemon/5", body, 1).await;
    mock_json(&mut server, "/pokemon-species/5", species_body(vec![]), 1).await;

    let err = client(&server)
        .fetch(Some(pokedex_card::validate("5").unwrap()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        FetchError::Decode("missing `special-attack` stat".to_string())
    );
}

#[tokio::test]
async fn species_failure_keeps_the_previous_card() {
    let mut server = mockito::Server::new_async().await;
    mock_json(&mut server, "/pokemon/1", primary_body(1, "bulbasaur"), 1).await;
    mock_json(
        &mut server,
        "/pokemon-species/1",
        species_body(vec![flavor("es", "Una rara semilla.")]),
        1,
    )
    .await;
    mock_json(&mut server, "/pokemon/7", primary_body(7, "squirtle"), 1).await;
    mock_status(&mut server, "/pokemon-species/7", 503).await;

    let api = client(&server);
    let mut controller = Controller::new();

    let first = controller.begin();
    let result = api.fetch(Some(pokedex_card::validate("1").unwrap())).await;
    assert_eq!(controller.complete(first, result), Transition::Displayed);
    let shown = controller.current().cloned().unwrap();

    let second = controller.begin();
    let result = api.fetch(Some(pokedex_card::validate("7").unwrap())).await;
    assert!(matches!(result, Err(FetchError::Network(_))));
    assert_eq!(controller.complete(second, result), Transition::Failed);

    assert!(matches!(controller.state(), ViewState::Failed(_)));
    assert_eq!(controller.current(), Some(&shown));
}

#[tokio::test]
async fn dropped_species_connection_keeps_the_previous_card() {
    let mut server = mockito::Server::new_async().await;
    mock_json(&mut server, "/pokemon/1", primary_body(1, "bulbasaur"), 1).await;
    mock_json(
        &mut server,
        "/pokemon-species/1",
        species_body(vec![flavor("es", "Una rara semilla.")]),
        1,
    )
    .await;
    let healthy = client(&server);
    let flaky = client_at(
        &serve_primary_then_hang_up(primary_body(7, "squirtle")),
        Duration::from_secs(5),
    );
    let mut controller = Controller::new();

    let first = controller.begin();
    let result = healthy.fetch(Some(pokedex_card::validate("1").unwrap())).await;
    assert_eq!(controller.complete(first, result), Transition::Displayed);
    let shown = controller.current().cloned().unwrap();

    let second = controller.begin();
    let result = flaky.fetch(Some(pokedex_card::validate("7").unwrap())).await;
    assert!(matches!(result, Err(FetchError::Network(_))), "{result:?}");
    assert_eq!(controller.complete(second, result), Transition::Failed);

    assert!(matches!(controller.state(), ViewState::Failed(_)));
    assert_eq!(controller.current(), Some(&shown));
}

#[tokio::test]
async fn refused_connection_is_a_network_failure() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let err = client_at(&format!("http://{}", addr), Duration::from_secs(5))
        .fetch(Some(pokedex_card::validate("1").unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn silent_server_times_out_as_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        // accept and never answer
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
        }
    });

    let api = client_at(&format!("http://{}", addr), Duration::from_secs(1));
    let started = Instant::now();
    let err = api
        .fetch(Some(pokedex_card::validate("1").unwrap()))
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, FetchError::Network(_)), "{err:?}");
    assert!(
        elapsed >= Duration::from_millis(900) && elapsed < Duration::from_secs(5),
        "took {elapsed:?}"
    );
}

#[tokio::test]
async fn random_path_requests_an_in_range_identifier() {
    let mut server = mockito::Server::new_async().await;
    let mut rng = StdRng::seed_from_u64(42);
    let expected = Identifier::random(&mut rng.clone()).get();
    assert!((1..=809).contains(&expected));

    let primary = mock_json(
        &mut server,
        &format!("/pokemon/{}", expected),
        primary_body(expected, "whoever"),
        1,
    )
    .await;
    mock_json(
        &mut server,
        &format!("/pokemon-species/{}", expected),
        species_body(vec![]),
        1,
    )
    .await;

    let model = client(&server).fetch_random_with(&mut rng).await.unwrap();
    assert_eq!(model.id, expected);
    primary.assert_async().await;
}

#[tokio::test]
async fn unseeded_random_path_hits_the_primary_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let primary = server
        .mock(
            "GET",
            Matcher::Regex(r"^/pokemon/([1-9]|[1-9][0-9]|[1-7][0-9][0-9]|80[0-9])$".to_string()),
        )
        .with_status(200)
        .with_body(primary_body(1, "bulbasaur"))
        .expect(20)
        .create_async()
        .await;
    mock_json(&mut server, "/pokemon-species/1", species_body(vec![]), 20).await;

    let api = client(&server);
    for _ in 0..20 {
        api.fetch(None).await.unwrap();
    }
    primary.assert_async().await;
}

#[tokio::test]
async fn downloads_sprite_bytes() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/sprites/1.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body([0x89u8, b'P', b'N', b'G'])
        .create_async()
        .await;

    let url = format!("{}/sprites/1.png", server.url());
    let bytes = client(&server).fetch_sprite(&url).await.unwrap();
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}
