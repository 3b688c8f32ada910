use super::{FieldSpec, PromptDefinition, TemplateBody};

const TITLE: &str = include_str!("templates/title.txt");
const COMMENT: &str = include_str!("templates/comment.txt");
const IMAGE_PROMPT: &str = include_str!("templates/image_prompt.txt");
const POST: &str = include_str!("templates/post.json");

fn field(name: &str, label: &str, hint: &str, placeholders: &[&str]) -> FieldSpec {
    FieldSpec {
        name: name.into(),
        label: label.into(),
        hint: hint.into(),
        placeholders: placeholders.iter().map(|p| p.to_string()).collect(),
    }
}

fn prompt(
    id: &str,
    name: &str,
    description: &str,
    template: TemplateBody,
    fields: Vec<FieldSpec>,
) -> PromptDefinition {
    PromptDefinition {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        template,
        fields,
    }
}

pub(super) fn prompts() -> Vec<PromptDefinition> {
    vec![
        prompt(
            "TITLE",
            "LinkedIn Post Title",
            "Generate a scroll-stopping LinkedIn post title",
            TemplateBody::Text(TITLE.into()),
            vec![],
        ),
        prompt(
            "COMMENT",
            "LinkedIn Comment Reply",
            "Generate a strategic reply to a LinkedIn comment",
            TemplateBody::Text(COMMENT.into()),
            vec![
                field(
                    "post_topic",
                    "Original Post Topic",
                    "E.g., AI + Software Engineering",
                    &["POST_TOPIC"],
                ),
                field(
                    "post_summary",
                    "Original Post Summary",
                    "Brief summary of the post...",
                    &["SHORT_SUMMARY"],
                ),
                field(
                    "comment",
                    "Comment Received",
                    "Paste the comment you want to reply to...",
                    &["PASTE_COMMENT_HERE"],
                ),
            ],
        ),
        prompt(
            "IMAGE_PROMPT",
            "AI Image Prompt",
            "Create a professional image prompt for LinkedIn visual",
            TemplateBody::Text(IMAGE_PROMPT.into()),
            vec![field(
                "input",
                "Post theme or concept",
                "Type or paste your content here...",
                &["USER_INPUT"],
            )],
        ),
        prompt(
            "POST",
            "Complete LinkedIn Post",
            "Generate a full viral LinkedIn post with title and content",
            TemplateBody::Document(POST.into()),
            vec![field(
                "input",
                "Post title or topic",
                "Type or paste your content here...",
                &["INSERT_TITLE_HERE"],
            )],
        ),
    ]
}
