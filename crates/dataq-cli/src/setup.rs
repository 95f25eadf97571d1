use anyhow::Result;
use dataq_core::providers::azure::{DEFAULT_API_VERSION, DEFAULT_DEPLOYMENT};
use dataq_core::Credentials;
use std::io::{self, BufRead, Write};

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn read_or_default(prompt: &str, default: &str) -> Result<String> {
    let value = read_line(&format!("{prompt} [{default}]: "))?;
    Ok(if value.is_empty() {
        default.to_string()
    } else {
        value
    })
}

fn read_secret(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    Ok(rpassword::read_password()?.trim().to_string())
}

pub fn run_setup() -> Result<Credentials> {
    println!("\nConfigure a completion backend for dataq.\n");
    println!("  [1] OpenAI          (api.openai.com)");
    println!("  [2] Azure OpenAI    (your resource endpoint)");
    println!("  [3] Anthropic       (api.anthropic.com)");
    println!("  [4] Ollama          (localhost, no key needed)");
    println!("  [5] Other OpenAI-compatible server");

    let creds = match read_line("\n> ")?.as_str() {
        "1" => Credentials::OpenAi {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: read_secret("API key: ")?,
            model: read_or_default("Model", "gpt-4o")?,
        },
        "2" => Credentials::AzureOpenAi {
            endpoint: read_line("Endpoint (https://<resource>.openai.azure.com): ")?,
            api_key: read_secret("API key: ")?,
            deployment: read_or_default("Deployment", DEFAULT_DEPLOYMENT)?,
            api_version: read_or_default("API version", DEFAULT_API_VERSION)?,
        },
        "3" => Credentials::Anthropic {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: read_secret("API key: ")?,
            model: read_line("Model: ")?,
        },
        "4" => Credentials::OpenAi {
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: String::new(),
            model: read_or_default("Model", "llama3.2")?,
        },
        "5" => Credentials::OpenAi {
            base_url: read_line("Base URL: ")?,
            api_key: read_secret("API key (empty for none): ")?,
            model: read_line("Model: ")?,
        },
        other => anyhow::bail!("unknown choice '{other}'"),
    };

    // Refuse to save something that cannot build a provider.
    creds.validate()?;
    creds.save()?;
    println!("Saved to {}\n", Credentials::path().display());
    Ok(creds)
}
