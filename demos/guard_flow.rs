//! Guard request flow demonstration.
//!
//! This example shows how a web integration drives the guard:
//! 1. Load configuration and declare route-group policies at startup
//! 2. Look up the policy for the route serving a request
//! 3. Run the pre-action hook
//! 4. Either run the action or send the redirect
//!
//! Run with: `cargo run --example guard_flow`

use protocol_guard::web::{Decision, ProtocolGuard, RecordingResponder, RequestAdapter};
use protocol_guard::{ActionPolicy, GlobalConfig, PolicyRegistry, RedirectStatus, SharedConfig};

/// Simulates an incoming request
fn incoming(action: &str, path: &str, port: u16, tls: bool, forwarded: bool) -> RequestAdapter {
    let mut request = RequestAdapter::new(action, "shop.example.com", path);
    request.set_port(Some(port));
    request.set_transport_secure(tls);
    if forwarded {
        request.add_header("X-Forwarded-Ssl", "on");
    }
    request
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Step 1: configuration and policies
    let config = GlobalConfig::from_toml_str(
        r#"
        secure_host = "secure.shop.example.com"
        trusted_scheme_header = "X-Forwarded-Ssl"
        redirect_status = 302
        "#,
    )?;
    let guard = ProtocolGuard::with_shared(SharedConfig::new(config));

    let mut registry = PolicyRegistry::new();
    registry.register(
        "storefront",
        ActionPolicy::builder().declare_allowed(["search"]).build(),
    );
    registry.register_nested(
        "storefront",
        "checkout",
        ActionPolicy::builder()
            .declare_exceptions(["shipping_estimate"])
            .redirect_status(RedirectStatus::SeeOther)
            .build(),
    );

    let requests = [
        ("storefront", incoming("index", "/", 80, false, false)),
        ("storefront", incoming("index", "/", 443, true, false)),
        ("storefront", incoming("search", "/search?q=tea", 443, true, false)),
        ("checkout", incoming("pay", "/checkout/pay", 80, false, false)),
        ("checkout", incoming("pay", "/checkout/pay", 80, false, true)),
        ("checkout", incoming("shipping_estimate", "/checkout/ship?zip=1", 8080, false, false)),
    ];

    for (group, request) in &requests {
        // Steps 2 and 3: policy lookup and hook
        let policy = registry.policy_for(group);
        let mut responder = RecordingResponder::new();
        let decision = guard.ensure_proper_protocol(policy, request, &mut responder);

        // Step 4: act on the decision
        match decision {
            Decision::Proceed => println!("{group}: running action"),
            Decision::Redirected(redirect) => println!(
                "{group}: {} -> {} (flash kept: {})",
                redirect.status,
                redirect.location,
                responder.transient_kept()
            ),
        }
    }

    Ok(())
}
