//! The three design-to-code flows on top of any [`CodeGenerator`].

use tailcast_core::models::ProjectedNode;

use crate::gemini::prompts;
use crate::image::ImagePart;
use crate::sanitize::{strip_fences, strip_fences_and_comments};
use crate::traits::{CodeGenerator, GenerationRequest, Sampling};

/// Near-deterministic sampling for the CSS snippet flow.
pub const SNIPPET_SAMPLING: Sampling = Sampling {
    temperature: 0.1,
    top_k: 1,
    top_p: 1.0,
};

/// Generate React code from a projected Figma tree.
pub async fn figma_to_react<G: CodeGenerator>(
    generator: &G,
    design: &ProjectedNode,
) -> Result<String, G::Error> {
    let json = serde_json::to_string_pretty(design).unwrap_or_else(|_| "{}".to_string());
    let prompt = format!("{}{json}\n", prompts::FIGMA_TO_REACT);
    let text = generator.generate(GenerationRequest::text(prompt)).await?;
    Ok(strip_fences(&text))
}

/// Generate React code from a CSS snippet, optionally guided by a reference image.
pub async fn css_to_react<G: CodeGenerator>(
    generator: &G,
    css: &str,
    image: Option<ImagePart>,
) -> Result<String, G::Error> {
    let prompt = format!("{}{css}\n", prompts::CSS_TO_REACT);
    let request = GenerationRequest::text(prompt)
        .with_image(image)
        .with_sampling(SNIPPET_SAMPLING);
    let text = generator.generate(request).await?;
    Ok(strip_fences_and_comments(&text))
}

/// Generate React code from a UI screenshot.
pub async fn image_to_react<G: CodeGenerator>(
    generator: &G,
    image: ImagePart,
) -> Result<String, G::Error> {
    let request = GenerationRequest::text(prompts::IMAGE_TO_REACT).with_image(Some(image));
    let text = generator.generate(request).await?;
    Ok(strip_fences(&text))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::gemini::GeminiError;

    /// Records requests and replays a canned answer.
    struct Canned {
        reply: &'static str,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl Canned {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl CodeGenerator for Canned {
        type Error = GeminiError;

        async fn generate(&self, request: GenerationRequest) -> Result<String, GeminiError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn test_figma_flow_embeds_json_and_strips_fences() {
        let gen = Canned::new("```jsx\nexport default function Card() { return <div/>; }\n```");
        let design = ProjectedNode {
            name: Some("Card".into()),
            node_type: Some("FRAME".into()),
            ..Default::default()
        };

        let code = figma_to_react(&gen, &design).await.unwrap();
        assert_eq!(code, "export default function Card() { return <div/>; }");

        let seen = gen.seen.lock().unwrap();
        assert!(seen[0].prompt.contains("\"name\": \"Card\""));
        assert!(seen[0].image.is_none());
        assert!(seen[0].sampling.is_none());
    }

    #[tokio::test]
    async fn test_css_flow_strips_comments_and_sets_sampling() {
        let gen = Canned::new("<div>{/* Header */}<p>Hi</p></div> // done");
        let image = ImagePart {
            mime_type: "image/png".into(),
            data: "AA==".into(),
        };

        let code = css_to_react(&gen, "width: 10px;", Some(image.clone()))
            .await
            .unwrap();
        assert_eq!(code, "<div><p>Hi</p></div>");

        let seen = gen.seen.lock().unwrap();
        assert!(seen[0].prompt.ends_with("width: 10px;\n"));
        assert_eq!(seen[0].image, Some(image));
        assert_eq!(seen[0].sampling, Some(SNIPPET_SAMPLING));
    }

    #[tokio::test]
    async fn test_image_flow_sends_image() {
        let gen = Canned::new("function Shot() { return <main/>; }");
        let image = ImagePart {
            mime_type: "image/jpeg".into(),
            data: "/9j/".into(),
        };

        let code = image_to_react(&gen, image).await.unwrap();
        assert_eq!(code, "function Shot() { return <main/>; }");
        assert_eq!(gen.seen.lock().unwrap()[0].image.as_ref().unwrap().mime_type, "image/jpeg");
    }
}
