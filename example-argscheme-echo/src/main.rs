use argscheme::MessageError;
use argscheme::codec::{ArgScheme, SchemeRegistry};
use argscheme::constants::CALLER_NAME_KEY;
use argscheme::message::{Request, ResponseBuilder};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Echo {
    message: String,
    repeat: u32,
}

fn main() -> Result<(), MessageError> {
    // Try `RUST_LOG=argscheme=trace`
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = SchemeRegistry::global();

    for scheme in [ArgScheme::Json, ArgScheme::Thrift] {
        let request = Request::<Echo>::builder(
            Echo {
                message: "hello".into(),
                repeat: 2,
            },
            "echo-service",
            "echo",
        )
        .set_arg_scheme(scheme)
        .set_transport_header(CALLER_NAME_KEY, "example-argscheme-echo")
        .set_header("trace", "on")
        .build()?;

        tracing::info!("Calling {}", request);

        // Callee side: answer with a structured reply.
        let reply = match request.body() {
            Some(echo) => Echo {
                message: echo.message.repeat(echo.repeat as usize),
                repeat: 1,
            },
            None => Echo {
                message: String::new(),
                repeat: 0,
            },
        };

        let outbound = ResponseBuilder::for_request(&request, 1)?
            .set_headers(request.headers().clone())?
            .set_body(reply)?
            .build(registry)?;

        tracing::info!("Replying with {}", outbound);

        // Caller side: receive raw payloads and decode on demand.
        let (arg2, arg3) = outbound.into_args();
        let inbound = ResponseBuilder::<Echo>::for_request(&request, 1)?
            .set_arg2(arg2)?
            .set_arg3(arg3)?
            .build(registry)?;

        tracing::info!(
            "Received headers {:?} and body {:?}",
            inbound.headers(registry)?,
            inbound.body(registry)?
        );
    }

    Ok(())
}
