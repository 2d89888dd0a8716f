//! Collaborator traits implemented by framework integrations.
//!
//! The guard never talks to a web framework directly. It reads the request
//! through [`GuardRequest`] and acts through [`RedirectResponder`].

use crate::config::RedirectStatus;

/// Read access to the parts of a request the guard inspects.
///
/// # Examples
///
/// ```
/// use protocol_guard::web::GuardRequest;
///
/// // Example framework-specific implementation
/// struct MyFrameworkRequest {
///     tls: bool,
///     host: String,
///     port: u16,
///     uri: String,
///     route: String,
/// }
///
/// impl GuardRequest for MyFrameworkRequest {
///     fn is_transport_secure(&self) -> bool {
///         self.tls
///     }
///
///     fn header_value(&self, _name: &str) -> Option<&str> {
///         None
///     }
///
///     fn host(&self) -> &str {
///         &self.host
///     }
///
///     fn port(&self) -> Option<u16> {
///         Some(self.port)
///     }
///
///     fn full_path_with_query(&self) -> &str {
///         &self.uri
///     }
///
///     fn action_name(&self) -> &str {
///         &self.route
///     }
/// }
/// ```
pub trait GuardRequest {
    /// Returns `true` if the connection itself is TLS.
    fn is_transport_secure(&self) -> bool;

    /// Returns the value of header `name`, matched case-insensitively.
    fn header_value(&self, name: &str) -> Option<&str>;

    /// Returns `true` if header `name` is present with a non-blank value.
    ///
    /// Override when the request can hold header values that
    /// [`header_value`](GuardRequest::header_value) cannot return as text.
    fn has_header(&self, name: &str) -> bool {
        self.header_value(name)
            .is_some_and(|value| !value.trim().is_empty())
    }

    /// Returns the host the client addressed, without port.
    fn host(&self) -> &str;

    /// Returns the port the client connected to, if known.
    fn port(&self) -> Option<u16>;

    /// Returns the request path including any query string.
    fn full_path_with_query(&self) -> &str;

    /// Returns the name of the action the request is routed to.
    fn action_name(&self) -> &str;
}

/// Side effects the guard needs from the response layer.
pub trait RedirectResponder {
    /// Ends normal handling with a redirect to `url`.
    fn redirect(&mut self, url: &str, status: RedirectStatus);

    /// Keeps one-shot flash messages alive for the next request.
    fn keep_transient_messages(&mut self);
}

impl<T: GuardRequest + ?Sized> GuardRequest for &T {
    fn is_transport_secure(&self) -> bool {
        (**self).is_transport_secure()
    }

    fn header_value(&self, name: &str) -> Option<&str> {
        (**self).header_value(name)
    }

    fn has_header(&self, name: &str) -> bool {
        (**self).has_header(name)
    }

    fn host(&self) -> &str {
        (**self).host()
    }

    fn port(&self) -> Option<u16> {
        (**self).port()
    }

    fn full_path_with_query(&self) -> &str {
        (**self).full_path_with_query()
    }

    fn action_name(&self) -> &str {
        (**self).action_name()
    }
}

impl<T: RedirectResponder + ?Sized> RedirectResponder for &mut T {
    fn redirect(&mut self, url: &str, status: RedirectStatus) {
        (**self).redirect(url, status);
    }

    fn keep_transient_messages(&mut self) {
        (**self).keep_transient_messages();
    }
}
