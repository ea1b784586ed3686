use llm::{
    chat::{ChatMessage, ChatProvider, ChatResponse, Tool},
    error::LLMError,
};

#[macro_export]
macro_rules! assert_sequences {
    (
        $(
            $test_name:ident : response => $response:expr, emails => $emails:expr, name => $name:expr
        ),+ $(,)?
    ) => {
        $(
            #[tokio::test]
            async fn $test_name() {
                let funnel = $crate::funnel_extras::sample_funnel("Acme", 2, 2).await;
                let context = funnelcraft::EmailContext {
                    model: &StubLlmProvider::new($response.to_owned()),
                };
                let result = funnelcraft::generate_email_sequence(
                    &funnel,
                    &funnelcraft::EmailParams::default(),
                    &context,
                )
                .await;

                assert_that(&result.is_fallback()).is_false();
                let sequence = result.into_record();
                assert_that(&sequence.num_emails).is_equal_to($emails);
                assert_that(&sequence.emails).has_length($emails);
                assert_that(&sequence.sequence_name).is_equal_to($name.to_owned());
                assert_that(&sequence.brand_name).is_equal_to("Acme".to_owned());
                assert_that(&sequence.error).is_none();
            }
        )+
    }
}

/// Chat provider answering every request with a fixed response or a fixed error.
pub(crate) struct StubLlmProvider {
    response_content: Result<String, String>,
}

impl StubLlmProvider {
    pub fn new(response_content: String) -> Self {
        StubLlmProvider {
            response_content: Ok(response_content),
        }
    }

    pub fn failing(message: &str) -> Self {
        StubLlmProvider {
            response_content: Err(message.to_owned()),
        }
    }
}

impl ChatProvider for StubLlmProvider {
    fn chat<'life0, 'life1, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            #[derive(Debug)]
            struct StringResponse(String);

            impl ChatResponse for StringResponse {
                fn text(&self) -> Option<String> {
                    Some(self.0.clone())
                }

                fn tool_calls(&self) -> Option<Vec<llm::ToolCall>> {
                    panic!()
                }

                fn thinking(&self) -> Option<String> {
                    None
                }

                fn usage(&self) -> Option<llm::chat::Usage> {
                    None
                }
            }

            impl std::fmt::Display for StringResponse {
                fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(formatter, "{}", self.0)
                }
            }

            match &self.response_content {
                Ok(content) => {
                    Ok(Box::new(StringResponse(content.clone())) as Box<dyn ChatResponse>)
                }
                Err(message) => Err(LLMError::ProviderError(message.clone())),
            }
        })
    }

    fn chat_with_tools<'life0, 'life1, 'life2, 'async_trait>(
        &'life0 self,
        _messages: &'life1 [ChatMessage],
        _tools: Option<&'life2 [Tool]>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Box<dyn ChatResponse>, LLMError>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        Self: 'async_trait,
    {
        panic!()
    }
}
