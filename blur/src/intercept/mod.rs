//! Interception glue: redacting arguments and return values at a method
//! boundary.
//!
//! The glue never looks at annotations itself. For every parameter whose
//! declared type passes the presence probe, the argument is replaced with its
//! redacted form; the method then proceeds, and the return value is treated
//! the same way. [`Advisor`] pairs the interceptor with a [`Pointcut`] computed
//! once at startup.

mod pointcut;

use std::{borrow::Cow, sync::Arc};

pub use pointcut::Pointcut;

use crate::{
    config::BlurProperties,
    engine::Blur,
    error::{BoxError, Error, Result},
    types::AnnotatedType,
    value::Value,
};

// =============================================================================
// Method description
// =============================================================================

/// A declared method parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    name: Cow<'static, str>,
    annotated_type: AnnotatedType,
}

impl Parameter {
    pub fn new(name: impl Into<Cow<'static, str>>, annotated_type: AnnotatedType) -> Self {
        Self {
            name: name.into(),
            annotated_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotated_type(&self) -> &AnnotatedType {
        &self.annotated_type
    }
}

/// The declaration of an intercepted method: its path, its parameters and its
/// annotated return type.
///
/// ```rust
/// use blur::{AnnotatedType, Email, Method};
///
/// let method = Method::new("app::users::UserController::find_email")
///     .parameter("id", AnnotatedType::class("i64"))
///     .returns(AnnotatedType::class("String").with::<Email>());
/// assert_eq!(method.parameters().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    path: Cow<'static, str>,
    parameters: Vec<Parameter>,
    annotated_return_type: AnnotatedType,
}

impl Method {
    /// A method with no parameters returning the unit type `()`.
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        Self {
            path: path.into(),
            parameters: Vec::new(),
            annotated_return_type: AnnotatedType::class("()"),
        }
    }

    #[must_use]
    pub fn parameter(
        mut self,
        name: impl Into<Cow<'static, str>>,
        annotated_type: AnnotatedType,
    ) -> Self {
        self.parameters.push(Parameter::new(name, annotated_type));
        self
    }

    #[must_use]
    pub fn returns(mut self, annotated_return_type: AnnotatedType) -> Self {
        self.annotated_return_type = annotated_return_type;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn annotated_return_type(&self) -> &AnnotatedType {
        &self.annotated_return_type
    }
}

// =============================================================================
// Invocation
// =============================================================================

/// One call of an intercepted method, as seen by the interceptor.
pub trait Invocation {
    fn method(&self) -> &Arc<Method>;

    /// Arguments in parameter order. The interceptor may replace them.
    fn arguments_mut(&mut self) -> &mut [Value];

    /// Runs the method with the current arguments.
    fn proceed(self) -> Result<Value>;
}

/// An [`Invocation`] backed by a closure over the arguments.
pub struct MethodInvocation<F> {
    method: Arc<Method>,
    arguments: Vec<Value>,
    target: F,
}

impl<F> MethodInvocation<F>
where
    F: FnOnce(Vec<Value>) -> std::result::Result<Value, BoxError>,
{
    pub fn new(method: Arc<Method>, arguments: Vec<Value>, target: F) -> Self {
        Self {
            method,
            arguments,
            target,
        }
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
}

impl<F> Invocation for MethodInvocation<F>
where
    F: FnOnce(Vec<Value>) -> std::result::Result<Value, BoxError>,
{
    fn method(&self) -> &Arc<Method> {
        &self.method
    }

    fn arguments_mut(&mut self) -> &mut [Value] {
        &mut self.arguments
    }

    fn proceed(self) -> Result<Value> {
        (self.target)(self.arguments).map_err(Error::Proceed)
    }
}

// =============================================================================
// BlurInterceptor
// =============================================================================

/// Redacts the arguments and the return value of an invocation.
#[derive(Clone, Debug)]
pub struct BlurInterceptor {
    blur: Arc<Blur>,
}

impl BlurInterceptor {
    pub fn new(blur: Arc<Blur>) -> Self {
        Self { blur }
    }

    pub fn blur(&self) -> &Arc<Blur> {
        &self.blur
    }

    pub fn invoke<I: Invocation>(&self, mut invocation: I) -> Result<Value> {
        let method = Arc::clone(invocation.method());

        let arguments = invocation.arguments_mut();
        for (parameter, argument) in method.parameters().iter().zip(arguments.iter_mut()) {
            if !parameter.annotated_type().requires_redaction() {
                continue;
            }
            let original = std::mem::take(argument);
            *argument = self.blur.redact(original, parameter.annotated_type())?;
            tracing::debug!(
                method = method.path(),
                parameter = parameter.name(),
                "redacted argument"
            );
        }

        let returned = invocation.proceed()?;
        if !method.annotated_return_type().requires_redaction() {
            return Ok(returned);
        }
        let redacted = self.blur.redact(returned, method.annotated_return_type())?;
        tracing::debug!(method = method.path(), "redacted return value");
        Ok(redacted)
    }
}

// =============================================================================
// Advisor
// =============================================================================

/// A pointcut paired with the interceptor it guards.
///
/// Built once at startup from [`BlurProperties`] and the application's root
/// module path. When no pointcut expression is configured, every method under
/// the root module is intercepted.
#[derive(Clone, Debug)]
pub struct Advisor {
    pointcut: Pointcut,
    interceptor: BlurInterceptor,
}

impl Advisor {
    pub fn new(properties: &BlurProperties, root_module: &str, blur: Arc<Blur>) -> Result<Self> {
        let expression = properties.pointcut_expression_or_default(root_module);
        let pointcut: Pointcut = expression.parse()?;
        tracing::debug!(pointcut = %pointcut, "blur advisor ready");
        Ok(Self {
            pointcut,
            interceptor: BlurInterceptor::new(blur),
        })
    }

    pub fn pointcut(&self) -> &Pointcut {
        &self.pointcut
    }

    pub fn interceptor(&self) -> &BlurInterceptor {
        &self.interceptor
    }

    /// Runs `invocation` through the interceptor when the pointcut selects its
    /// method, and proceeds untouched otherwise.
    pub fn advise<I: Invocation>(&self, invocation: I) -> Result<Value> {
        if self.pointcut.matches(invocation.method().path()) {
            self.interceptor.invoke(invocation)
        } else {
            invocation.proceed()
        }
    }
}
