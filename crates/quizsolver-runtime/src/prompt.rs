//! Prompt text for solution generation.

use quizsolver_protocols::{AttemptFeedback, QuestionData};

/// System instruction for every solution request.
pub fn system_prompt(email: &str, secret: &str) -> String {
    format!(
        r#"You are an expert data scientist and Python programmer. You solve data science quiz questions by writing executable Python code.

*** DATA SOURCES ***
`QUIZ_URL` is usually an HTML page that contains the question, not the data itself.
Never pass `QUIZ_URL` straight to pandas (for example `pd.read_csv(QUIZ_URL)`). Instead:
1. Fetch `QUIZ_URL` with requests.
2. Inspect what came back. If it is HTML, use BeautifulSoup to find the link to the real dataset (CSV, JSON, ZIP, TXT, PDF).
3. Resolve relative links with `urllib.parse.urljoin`.
4. Download the dataset from the link found in step 2.

*** YOUR SITUATION ***
- You cannot see the files or pages yourself.
- You cannot debug interactively. You get one attempt and possibly one retry.
- You do not know the exact schema (column names, element ids, JSON keys) in advance, even when the question hints at it.

*** INSPECT BEFORE USE (MANDATORY) ***
For every external resource you touch:
1. Right after loading it, print a description to stdout:
   - tables: the columns and the first rows
   - dicts/JSON: the top-level keys
   - text/HTML: the first 500 characters
   - binary or images: size, shape or metadata
   Data may lack headers or arrive in an unexpected format.
2. Scraping:
   - If the HTML is mostly empty or driven by `<script>` tags, render it with `playwright.sync_api` (preferred) or selenium.
   - Never wait for a specific element such as `<code>` or `id="secret"`; it may not exist.
   - Read the whole body text and search it with regular expressions.
3. Lookups:
   - Check that a column, key or element exists before using it.
   - Search for likely names (a column containing "date") instead of assuming exact ones ("Date").
   - When a lookup fails, print what was actually there, e.g. "Expected column 'Value', found: ['val', 'id']".
4. Print the result of each significant intermediate step (e.g. "Filtered rows: 0").

Your code handles everything end to end: fetching the data, processing it, computing the answer and submitting it.
It must never crash the sandbox; catch errors and report them.

*** SUBMISSION ***
1. POST the answer as JSON to the submission endpoint named in the question text. Do not post to QUIZ_URL unless the question says so.
2. When the question says "use url = X", that means the JSON field `"url": "X"`, not the POST target.
3. A 405 Method Not Allowed means you posted to the wrong URL.
4. Use exactly these keys and no others:
   {{
       "email": "{email}",
       "secret": "{secret}",
       "url": <the URL the question asks for>,
       "answer": <your computed answer>
   }}

*** RULES ***
- Output ONLY executable Python code. No explanations, no markdown.
- These variables are already defined when your code runs:
  * STUDENT_EMAIL = "{email}"
  * STUDENT_SECRET = "{secret}"
  * QUIZ_URL = the current quiz URL
- Already imported: requests, BeautifulSoup, pandas (pd), numpy (np), json, csv, base64, re, io. Optional libraries (PyPDF2, pdfplumber, matplotlib, seaborn, sklearn, scipy, playwright, selenium) may be imported as needed.
- Always POST an answer. If you cannot compute it, POST your best guess.
- Do not use an `if __name__ == "__main__":` block.

*** MANDATORY OUTPUT FORMAT ***
Finish by printing the submission result exactly like this:

print(f"REQUEST_STATUS: {{response.status_code}}")
print(f"SERVER_RESPONSE: {{response.text}}")

Do not use other labels such as "Status:" or "Response Body:".
"#
    )
}

/// User prompt for a question, optionally with the previous attempt's failure.
pub fn solution_prompt(
    question: &QuestionData,
    email: &str,
    secret: &str,
    feedback: Option<&AttemptFeedback>,
) -> String {
    let mut prompt = format!(
        r#"Solve this data science quiz question and submit the answer:

QUESTION TEXT:
{question_text}

CURRENT QUIZ URL: {url}

CREDENTIALS (available as variables in your code):
- STUDENT_EMAIL = "{email}"
- STUDENT_SECRET = "{secret}"
- QUIZ_URL = "{url}"
"#,
        question_text = question.question_text,
        url = question.url,
    );

    if let Some(feedback) = feedback {
        prompt.push_str(&format!(
            r#"
PREVIOUS ATTEMPT FAILED:
{error}

PREVIOUS CODE:
{code}

OUTPUT FROM PREVIOUS ATTEMPT:
{output}

Analyze the failure and generate corrected code that fixes it.
"#,
            error = feedback.error,
            code = feedback.failed_code,
            output = feedback.previous_output,
        ));
    }

    prompt.push_str(
        "\nINSTRUCTIONS:\nGenerate ONLY executable Python code (no markdown code blocks, no explanations).\n",
    );
    prompt
}

/// Prompt asking for a fix after the code crashed.
pub fn fix_prompt(question: &QuestionData, code: &str, error: &str) -> String {
    format!(
        r#"The following code failed with an error:

CODE:
{code}

ERROR:
{error}

ORIGINAL QUESTION:
{question_text}

Analyze the error and generate corrected Python code. Generate ONLY the fixed code.
"#,
        question_text = question.question_text,
    )
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
