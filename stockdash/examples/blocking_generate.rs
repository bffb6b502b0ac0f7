use stockdash::{config::EndpointConfig, types::generate::GenerateRequest, InferenceClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt::init();

    let client = InferenceClient::builder()
        .config(EndpointConfig::from_env())
        .build()?;

    let request = GenerateRequest::new("In two sentences, what drives a stock's trading volume?")
        .temperature(0.2);

    let answer = client.generate_text(request).await?;

    println!("Response: {}", answer);

    Ok(())
}
