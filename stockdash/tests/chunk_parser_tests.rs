use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use stockdash::parser::{ChunkEvent, ChunkParser};
use stockdash::types::generate::GenerateChunk;
use stockdash::{Error, Result};

// Helper function to create a stream from a vector of byte chunks
fn create_byte_stream(
    chunks: Vec<&str>,
) -> impl futures::Stream<Item = Result<Bytes>> + Send + Unpin + 'static {
    stream::iter(
        chunks
            .into_iter()
            .map(|s| Ok(Bytes::from(s.to_string())))
            .collect::<Vec<_>>(),
    )
}

fn chunk(response: &str, done: bool) -> ChunkEvent {
    ChunkEvent::Chunk(GenerateChunk {
        response: response.to_string(),
        done,
    })
}

#[tokio::test]
async fn test_parse_single_chunk() {
    let byte_stream = create_byte_stream(vec![
        "{\"model\":\"llama2\",\"created_at\":\"2023-08-04T19:22:45.499127Z\",\"response\":\"Hello\",\"done\":false}\n",
    ]);
    let mut parser = ChunkParser::new(byte_stream);
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("Hello", false));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn test_handle_incomplete_lines_and_buffering() {
    let line1 = r#"{"response":"Hello","done":false}"#;
    let line2 = r#"{"response":" World","done":true}"#;
    let second = format!("{}\n{}", &line1[10..], line2);
    let byte_stream = create_byte_stream(vec![&line1[..10], second.as_str(), "\n"]);
    let mut parser = ChunkParser::new(byte_stream);

    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("Hello", false));
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk(" World", true));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn test_several_lines_in_one_read() {
    let byte_stream = create_byte_stream(vec![
        "{\"response\":\"a\"}\n{\"response\":\"b\"}\n{\"response\":\"c\",\"done\":true}\n",
    ]);
    let events: Vec<ChunkEvent> = ChunkParser::new(byte_stream)
        .map(|e| e.unwrap())
        .collect()
        .await;
    assert_eq!(
        events,
        vec![chunk("a", false), chunk("b", false), chunk("c", true)]
    );
}

#[tokio::test]
async fn test_non_json_lines_are_malformed() {
    let byte_stream = create_byte_stream(vec![
        "This is a plain text message.\n",
        "{\"response\":\"JSON part\",\"done\":false}\n",
    ]);
    let mut parser = ChunkParser::new(byte_stream);
    match parser.next().await.unwrap().unwrap() {
        ChunkEvent::Malformed { line, error } => {
            assert_eq!(line, "This is a plain text message.");
            assert!(!error.is_empty());
        }
        other => panic!("Expected Malformed event, got {:?}", other),
    }
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("JSON part", false));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn test_empty_stream() {
    let mut parser = ChunkParser::new(create_byte_stream(vec![]));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn test_stream_with_only_blank_lines() {
    let mut parser = ChunkParser::new(create_byte_stream(vec!["\n", "\r\n\n", "   "]));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn test_trailing_line_without_newline_is_parsed() {
    let mut parser = ChunkParser::new(create_byte_stream(vec![
        "{\"response\":\"x\"}\n",
        "{\"response\":\"tail\",\"done\":true}",
    ]));
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("x", false));
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("tail", true));
    assert!(parser.next().await.is_none());
}

#[tokio::test]
async fn test_inner_error_is_passed_through() {
    let byte_stream = stream::iter(vec![
        Ok(Bytes::from("{\"response\":\"a\"}\n")),
        Err(Error::Protocol("boom".to_string())),
    ]);
    let mut parser = ChunkParser::new(byte_stream);
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("a", false));
    assert!(matches!(
        parser.next().await.unwrap(),
        Err(Error::Protocol(msg)) if msg == "boom"
    ));
}

#[tokio::test]
async fn test_invalid_utf8_line_is_malformed() {
    let byte_stream = stream::iter(vec![
        Ok::<_, Error>(Bytes::from_static(b"{\"response\":\"\xff\",\"done\":false}\n")),
        Ok(Bytes::from_static(b"{\"response\":\"b\",\"done\":true}\n")),
    ]);
    let mut parser = ChunkParser::new(byte_stream);
    assert!(matches!(
        parser.next().await.unwrap().unwrap(),
        ChunkEvent::Malformed { .. }
    ));
    assert_eq!(parser.next().await.unwrap().unwrap(), chunk("b", true));
    assert!(parser.next().await.is_none());
}
